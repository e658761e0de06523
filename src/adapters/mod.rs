// Adapters layer: concrete implementations of the domain ports (backend, draft storage).

pub mod drafts;
pub mod supabase;

pub use drafts::{FileDraftStore, MemoryDraftStore};
pub use supabase::SupabaseClient;
