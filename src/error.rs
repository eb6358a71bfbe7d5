use thiserror::Error;

/// Violations of the install/run/window state machine. These are programmer
/// errors and every one of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("cannot reinstall a game to a different host")]
    AlreadyInstalled,

    #[error("cannot run a game that is not installed to this host")]
    NotInstalledToHost,

    #[error("dependencies are not registered yet; install the game first")]
    DependenciesNotRegistered,

    #[error("unsupported platform, cannot create a desktop game host")]
    UnsupportedPlatform,
}

/// A strict container lookup came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("service of type {type_name} is not registered")]
    NotRegistered { type_name: &'static str },
}
