//! Three-link leg: derive the equations of motion and evaluate them.
//!
//! Usage: `cargo run --example leg_eom [params.json]`

use limb::{Expr, LegModel, LegParameters, Matrix};

fn print_column(name: &str, exprs: &[Expr]) {
    println!("{name} =");
    for (i, e) in exprs.iter().enumerate() {
        println!("  [{i}] {e}");
    }
    println!();
}

fn print_matrix(name: &str, m: &Matrix) {
    println!("{name} =");
    for r in 0..m.nrows() {
        for c in 0..m.ncols() {
            println!("  [{r},{c}] {}", m[(r, c)]);
        }
    }
    println!();
}

fn main() -> limb::Result<()> {
    tracing_subscriber::fmt::init();

    let params = match std::env::args().nth(1) {
        Some(path) => LegParameters::from_file(path)?,
        None => LegParameters::default(),
    };

    let model = LegModel::new()?;
    let eqs = model.derive()?;

    println!("Three-Link Leg (Kane's method)");
    println!("==============================\n");
    print_column("Fr + Fr*", &eqs.residual());
    print_matrix("M", &eqs.mass_matrix_full);
    print_column("f", &eqs.forcing_full);

    // ── Numeric evaluation ──
    let ode = eqs.ode_function()?;
    let p = params.values();
    let x = [0.05, -0.1, 0.08, 0.0, 0.0, 0.0];
    let r = [0.0; 3];

    println!("-- Evaluation --");
    println!("theta = [{:+.3}, {:+.3}, {:+.3}] rad", x[0], x[1], x[2]);
    println!("omega = [{:+.3}, {:+.3}, {:+.3}] rad/s", x[3], x[4], x[5]);
    println!("torques = [{:+.3}, {:+.3}, {:+.3}] N·m\n", r[0], r[1], r[2]);

    let m = ode.mass_matrix(&x, &r, &p);
    println!("M(x) = {m:.4}");
    let xdot = ode.rhs(&x, &r, &p)?;
    println!("x' = M⁻¹ f = {:.6}", xdot.transpose());

    // Upright with zero torques should be an equilibrium.
    let rest = ode.rhs(&[0.0; 6], &r, &p)?;
    if rest.norm() < 1e-12 {
        println!("PASS: upright rest is an equilibrium");
    } else {
        println!("FAIL: upright rest accelerates, |x'| = {:.2e}", rest.norm());
    }

    Ok(())
}
