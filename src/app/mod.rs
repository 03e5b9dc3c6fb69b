//! Application layer with dependency injection container.
//!
//! The container owns the infrastructure (the value table repository) and the
//! engine configuration, and builds trainers, agents and match controllers
//! from them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │       App (DI Container)             │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                       │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - CsvRepository                     │   │
//! │  │  - InMemoryRepository (testing)      │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                 │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - ValueTableRepository trait        │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic                        │   │
//! │  │  - Agent, ValueTable                 │   │
//! │  │  - SelfPlayTrainer, MatchController  │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod container;

pub use config::{DEFAULT_CONFIG_FILE, DEFAULT_MODEL_DIR, EngineConfig};
pub use container::{App, AppBuilder};
