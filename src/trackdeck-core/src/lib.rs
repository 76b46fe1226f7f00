pub mod collection;
pub mod config;
pub mod gateway;
pub mod gateway_contract;
pub mod logging;
pub mod memory;
pub mod models;
pub mod paths;
pub mod playback;
pub mod query;
pub mod validation;
pub mod workflows;

#[cfg(test)]
pub(crate) mod test_support;

pub use collection::{CollectionController, CollectionSnapshot, FetchOutcome, LoadStatus};
pub use config::{BrowseConfig, Config, ConfigError, GatewayConfig, LogLevel, LoggingConfig};
pub use gateway::{ErrorSurface, GatewayError, GatewayResult, TrackGateway};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use memory::MemoryGateway;
pub use models::{
    PageResult, Query, SortKey, StreamUrl, Track, TrackDraft, TrackId, TrackPatch,
};
pub use paths::{AppDirs, DirsError};
pub use playback::{PlaybackCoordinator, PlaybackError};
pub use query::QueryState;
pub use validation::{
    AudioFileError, AudioUpload, FieldError, FormErrors, FormField, TrackForm,
    AUDIO_CONTENT_TYPE, MAX_AUDIO_BYTES,
};
pub use workflows::{
    AudioChange, CreateError, CreateWorkflow, DeleteError, DeleteWorkflow, EditError,
    EditOutcome, EditWorkflow, WorkflowContext,
};

pub const APP_NAME: &str = "trackdeck";
pub const APP_AUTHOR: &str = "Trackdeck";
pub const APP_QUALIFIER: &str = "io";
