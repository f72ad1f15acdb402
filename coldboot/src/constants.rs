//! Deployment defaults.
//!
//! Centralized location for paths and commands baked into the worker image.

/// Environment variable naming the persistent volume mount.
pub const VOLUME_ENV: &str = "RUNPOD_VOLUME_PATH";

/// Volume mount used when the environment does not name one.
pub const DEFAULT_VOLUME_PATH: &str = "/runpod-volume";

/// Inference framework install root inside the image.
pub const DEFAULT_FRAMEWORK_ROOT: &str = "/app/ComfyUI";

/// Model manager invocation.
pub const DEFAULT_MODEL_MANAGER: &str = "python3 -u /app/utils/model_manager.py";

/// Request handler invocation.
pub const DEFAULT_HANDLER: &str = "python3 -u /app/handler.py";

/// File name used under `--log-dir`.
pub const LOG_FILE_NAME: &str = "coldboot.log";
