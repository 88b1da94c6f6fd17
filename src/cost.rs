//! Fixed per-symbol weights used to order the search.
//!
//! The weight belongs to the symbol name, not to a particular node. Names
//! outside the table (the hole categories among them) weigh nothing, so an
//! unexpanded hole never makes a tree look more expensive than it is.

pub const VARIABLE_WEIGHT: f64 = 0.0;
pub const LITERAL_WEIGHT: f64 = 0.0;
pub const BINOP_WEIGHT: f64 = 1.1;
pub const ITE_WEIGHT: f64 = 1.2;
pub const NOT_WEIGHT: f64 = 1.0;

pub fn weight(name: &str) -> f64 {
    match name {
        "x" | "y" | "z" => VARIABLE_WEIGHT,
        "1" | "2" | "3" => LITERAL_WEIGHT,
        "Ite" => ITE_WEIGHT,
        "Add" | "Multiply" | "Lt" | "Eq" | "And" | "Or" => BINOP_WEIGHT,
        "Not" => NOT_WEIGHT,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_free() {
        for name in ["E", "B", "Sub", "", "add", "4"] {
            assert_eq!(weight(name), 0.0, "{name}");
        }
    }

    #[test]
    fn operators_have_their_weight() {
        assert_eq!(weight("x"), 0.0);
        assert_eq!(weight("3"), 0.0);
        assert_eq!(weight("Add"), 1.1);
        assert_eq!(weight("Or"), 1.1);
        assert_eq!(weight("Ite"), 1.2);
        assert_eq!(weight("Not"), 1.0);
    }
}
