mod azure_video_indexer;
mod yt_dlp_downloader;

pub use azure_video_indexer::{
    AzureVideoIndexerClient, Insights, IndexedVideo, TextLine, VideoIndex, evidence_from_index,
    indexing_status,
};
pub use yt_dlp_downloader::YtDlpDownloader;
