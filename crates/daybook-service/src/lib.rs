//! gRPC service surface for the diary assistant.
//!
//! Provides:
//! - ExtractStyle RPC for style signature extraction
//! - MergeDiary / MergeDiaryStream RPCs for memo merging
//! - AnalyzeDiary, SummarizeWeek, SummarizeMonth RPCs for analysis
//! - Health check and reflection endpoints

pub mod server;
pub mod service;

pub mod pb {
    tonic::include_proto!("daybook");

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("daybook_descriptor");
}

pub use server::{run_server, run_server_with_shutdown};
pub use service::DiaryServiceImpl;
