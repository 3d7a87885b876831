use thiserror::Error;

use crate::device::error::DeviceError;

#[derive(Error, Debug)]
pub enum ExploreError {
    /// A collaborator call failed mid-exploration
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// No uniquely focused element appeared while seeking initial focus
    #[error("no focusable element found after {attempts} focus-advance events")]
    NoFocusableElement { attempts: usize },

    /// Focus stayed ambiguous for too many consecutive advances
    #[error("focus was ambiguous for {retries} consecutive focus-advance events")]
    FocusLost { retries: usize },
}
