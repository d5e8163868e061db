pub mod sequence;
pub mod supabase;
