pub mod assigner;
pub mod candidates;
pub mod engine;
pub mod finder;
pub mod generator;
pub mod locale;
pub mod normalize;
pub mod registry;
pub mod sqlite_store;
pub mod store;

pub use assigner::{locales_to_process, SlugAssigner};
pub use candidates::Candidates;
pub use engine::SlugEngine;
pub use finder::{Finder, FinderStrategy};
pub use generator::{
    CandidateGenerator, ConflictResolver, SequentialSuffixResolver, SlugAvailability,
    StoreBackedGenerator, UuidSuffixResolver,
};
pub use locale::LocaleContext;
pub use normalize::{DefaultNormalizer, Normalizer};
pub use registry::{register_model, ModelRegistry, RegisteredModel};
pub use sqlite_store::SqliteStore;
pub use store::{HistoryStore, SlugIndex, TranslationStore};
