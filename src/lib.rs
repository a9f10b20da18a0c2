//! # flink-session
//!
//! Session client for the Flink link service. Signs users in against the
//! `/login` endpoint and exposes the current auth token and username as
//! replayable observables that other components subscribe to.
//!
//! Modules, bottom-up: `replay` (latest-value broadcast channel), `toast`
//! (user notifications), `config`, `api` (login endpoint), `session` (the
//! sign-in/sign-out service), `store` (on-disk persistence), and `app` (the
//! composition root).

pub mod api;
pub mod app;
pub mod config;
pub mod replay;
pub mod session;
pub mod store;
pub mod toast;

pub use app::App;
pub use session::LoginService;
