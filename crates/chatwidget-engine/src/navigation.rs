//! Routes reached from the two modality dropdowns.

use std::fmt;
use std::str::FromStr;

/// A dropdown that navigates when its value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Goes to the modality detail page.
    ModalidadDetalle,
    /// Goes to the modality prediction page.
    ModalidadPrediccion,
}

impl Selector {
    /// Both selectors.
    pub const ALL: [Self; 2] = [Self::ModalidadDetalle, Self::ModalidadPrediccion];

    /// Element id of the dropdown.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::ModalidadDetalle => "selectorModalidadDetalle",
            Self::ModalidadPrediccion => "selectorModalidadPrediccion",
        }
    }

    /// Path prefix the selected value is appended to.
    pub fn route_prefix(self) -> &'static str {
        match self {
            Self::ModalidadDetalle => "/modalidad-detalle/",
            Self::ModalidadPrediccion => "/prediccion-modalidad/",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

impl FromStr for Selector {
    type Err = UnknownSelector;

    /// Accepts the element id or a short name (`detalle`, `prediccion`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detalle" | "selectorModalidadDetalle" => Ok(Self::ModalidadDetalle),
            "prediccion" | "predicción" | "selectorModalidadPrediccion" => {
                Ok(Self::ModalidadPrediccion)
            }
            other => Err(UnknownSelector(other.to_string())),
        }
    }
}

/// Error for a selector name that matches neither dropdown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown selector: {0} (expected detalle or prediccion)")]
pub struct UnknownSelector(String);

/// Path to navigate to when `selector` changes to `value`.
///
/// An empty selection navigates nowhere.
pub fn navigation_target(selector: Selector, value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    Some(format!(
        "{}{}",
        selector.route_prefix(),
        urlencoding::encode(value)
    ))
}
