use crate::ConversionError;

/// Lifecycle of a `Common` contract (`enum Common.States`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CommonState {
    Uninitialized,
    Active,
    /// Terminal: entered once a double update has been proven.
    Failed,
}

impl TryFrom<u8> for CommonState {
    type Error = ConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommonState::Uninitialized),
            1 => Ok(CommonState::Active),
            2 => Ok(CommonState::Failed),
            _ => Err(ConversionError::InvalidState(value)),
        }
    }
}

impl From<CommonState> for u8 {
    fn from(state: CommonState) -> Self {
        match state {
            CommonState::Uninitialized => 0,
            CommonState::Active => 1,
            CommonState::Failed => 2,
        }
    }
}
