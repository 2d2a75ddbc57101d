use std::fmt;

/// Failures that can occur while assembling a [`crate::descriptor::Descriptor`]
/// from its parameters, before any table has been built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// `nv` is zero, or exceeds the maximum number of variables a descriptor
    /// can address.
    TooManyVariables { nv: usize, max: usize },
    /// `var_ords.len() != nv`.
    VarOrdsLenMismatch { expected: usize, got: usize },
    /// `map_ords.len() != nmv`.
    MapOrdsLenMismatch { expected: usize, got: usize },
    /// a per-variable order exceeds the corresponding map order.
    VarExceedsMapOrd { var: usize, var_ord: u8, map_ord: u8 },
    /// the overall order implied by `map_ords` does not fit in a tag byte.
    OrderTooLarge { mo: u32, max: u32 },
    /// a knob's combined order budget exceeds the sum of its individual caps.
    KnobBudgetExceedsCaps { dk: u8, sum: u32 },
    /// a knob's combined order budget exceeds the overall maximum order.
    KnobBudgetExceedsMaxOrd { dk: u8, mo: u8 },
    /// optional variable names were supplied but don't match `nv`.
    VarNamesLenMismatch { expected: usize, got: usize },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::TooManyVariables { nv, max } => {
                write!(f, "nv={nv} exceeds the maximum of {max} variables")
            }
            ParamError::VarOrdsLenMismatch { expected, got } => {
                write!(f, "var_ords has {got} entries, expected {expected}")
            }
            ParamError::MapOrdsLenMismatch { expected, got } => {
                write!(f, "map_ords has {got} entries, expected {expected}")
            }
            ParamError::VarExceedsMapOrd { var, var_ord, map_ord } => {
                write!(
                    f,
                    "var_ords[{var}]={var_ord} exceeds map_ords[{var}]={map_ord}"
                )
            }
            ParamError::OrderTooLarge { mo, max } => {
                write!(f, "maximum order {mo} exceeds the representable limit {max}")
            }
            ParamError::KnobBudgetExceedsCaps { dk, sum } => {
                write!(f, "knob budget dk={dk} exceeds the sum of knob caps {sum}")
            }
            ParamError::KnobBudgetExceedsMaxOrd { dk, mo } => {
                write!(f, "knob budget dk={dk} exceeds the overall max order {mo}")
            }
            ParamError::VarNamesLenMismatch { expected, got } => {
                write!(f, "var_names has {got} entries, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Failures returned by the registry when interning or retrieving a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// all slots are occupied by live descriptors.
    Exhausted { capacity: usize },
    /// the requested slot id is out of range or currently empty.
    InvalidSlot { id: usize },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Exhausted { capacity } => {
                write!(f, "descriptor registry is full ({capacity} slots in use)")
            }
            RegistryError::InvalidSlot { id } => {
                write!(f, "descriptor slot {id} is empty or out of range")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// A single failing check out of a [`crate::descriptor::Descriptor::verify`] sweep.
///
/// The numeric `code` mirrors the stage-tagged scheme used by the table
/// consistency checkers this crate is modeled on: the leading digit names the
/// stage, the sign names which table family failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyError {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "consistency check {} failed: {}", self.code, self.message)
    }
}

impl std::error::Error for ConsistencyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_error_display_is_non_empty() {
        let e = ParamError::TooManyVariables { nv: 200, max: 100 };
        assert!(!e.to_string().is_empty());
    }

    #[test]
    fn registry_error_display_mentions_capacity() {
        let e = RegistryError::Exhausted { capacity: 100 };
        assert!(e.to_string().contains("100"));
    }
}
