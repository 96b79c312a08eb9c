//! Scalar symbols: constant parameters and functions of time.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// What a symbol stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    /// Time-invariant parameter (a length, a mass, gravity).
    Constant,
    /// Function of time. `order` counts the time derivatives taken.
    Dynamic { order: u8 },
}

/// A named scalar.
///
/// Two symbols are equal when both name and kind match, so `theta1` and its
/// time derivative `theta1'` are distinct symbols sharing a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    name: Arc<str>,
    kind: SymbolKind,
}

impl Symbol {
    /// Create a constant symbol.
    pub fn constant(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            kind: SymbolKind::Constant,
        }
    }

    /// Create a function of time (zeroth derivative).
    pub fn dynamic(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            kind: SymbolKind::Dynamic { order: 0 },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, SymbolKind::Dynamic { .. })
    }

    /// Number of time derivatives (0 for constants).
    pub fn order(&self) -> u8 {
        match self.kind {
            SymbolKind::Constant => 0,
            SymbolKind::Dynamic { order } => order,
        }
    }

    /// Time derivative of this symbol, `None` for constants.
    pub fn diff_t(&self) -> Option<Symbol> {
        match self.kind {
            SymbolKind::Constant => None,
            SymbolKind::Dynamic { order } => Some(Self {
                name: Arc::clone(&self.name),
                kind: SymbolKind::Dynamic { order: order + 1 },
            }),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.order() {
            write!(f, "'")?;
        }
        Ok(())
    }
}

/// Constant symbols, one per name.
pub fn symbols(names: &[&str]) -> Vec<Symbol> {
    names.iter().map(Symbol::constant).collect()
}

/// Functions of time, one per name.
pub fn dynamic_symbols(names: &[&str]) -> Vec<Symbol> {
    names.iter().map(Symbol::dynamic).collect()
}

/// Numbered functions of time: `dynamic_range("theta", 1..4)` gives
/// `theta1, theta2, theta3`.
pub fn dynamic_range(prefix: &str, range: Range<usize>) -> Vec<Symbol> {
    range
        .map(|i| Symbol::dynamic(format!("{prefix}{i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_order_and_display() {
        let theta = Symbol::dynamic("theta1");
        let thetad = theta.diff_t().unwrap();
        let thetadd = thetad.diff_t().unwrap();

        assert_eq!(thetad.order(), 1);
        assert_eq!(thetadd.to_string(), "theta1''");
        assert_ne!(theta, thetad);
        assert_eq!(thetad.name(), "theta1");
    }

    #[test]
    fn constants_have_no_time_derivative() {
        let g = Symbol::constant("g");
        assert!(g.diff_t().is_none());
        assert!(!g.is_dynamic());
        assert_eq!(g.order(), 0);
    }

    #[test]
    fn numbered_symbols() {
        let q = dynamic_range("theta", 1..4);
        let names: Vec<_> = q.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["theta1", "theta2", "theta3"]);
        assert!(q.iter().all(Symbol::is_dynamic));

        let p = symbols(&["m", "l"]);
        assert_eq!(p[1], Symbol::constant("l"));
    }
}
