pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod parser;
pub mod ports;
pub mod vocabulary;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::cart::{Cart, CartEntry, SessionId};
pub use domain::command::{CartAction, CartLine, CommandReceipt};
pub use domain::product::{Product, ProductId};
pub use engine::{CartCommandEngine, EngineSettings, ProductSnapshot, Resolution};
pub use errors::{DomainError, EngineError, InterfaceError};
pub use parser::{parse_utterance, CandidateItem, ParsedUtterance};
pub use ports::{
    CatalogError, ProductCatalog, SearchError, SearchHit, SemanticSearch, SessionStore,
    SessionStoreError,
};
pub use vocabulary::{VocabularySet, VocabularyStore};
