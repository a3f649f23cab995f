//! `compose-builder`: generate, validate and publish Compose Builder designs
//! from the command line.
//!
//! # Environment variables
//!
//! | Variable                      | Default                    | Description                     |
//! |-------------------------------|----------------------------|---------------------------------|
//! | `COMPOSE_BUILDER_CONFIG`      | --                         | JSON config file                |
//! | `COMPOSE_BUILDER_PACKAGE`     | `com.example.app`          | Kotlin package                  |
//! | `COMPOSE_BUILDER_FUNCTION`    | `MainScreen`               | Screen composable name          |
//! | `COMPOSE_BUILDER_MODE`        | `static`                   | `static` or `event-driven`      |
//! | `COMPOSE_BUILDER_OUTPUT_DIR`  | `generated`                | Project output directory        |
//! | `COMPOSE_BUILDER_REMOTE_KEY`  | `compose_design`           | Config key for `publish`        |
//! | `COMPOSE_BUILDER_STORE_DIR`   | `.compose-builder/config`  | Local config store              |
//! | `COMPOSE_BUILDER_LOG_LEVEL`   | `info`                     | Fallback when `RUST_LOG` unset  |
//! | `COMPOSE_BUILDER_LOG_FORMAT`  | `text`                     | `text` or `json`                |
//! | `FIREBASE_PROJECT_ID`, `FIREBASE_CLIENT_EMAIL`, `FIREBASE_PRIVATE_KEY` | -- | Publish credentials |

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{Cli, Command, Config, LogFormat};
