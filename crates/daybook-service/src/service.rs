//! DiaryService RPC implementation.
//!
//! Handlers translate proto messages to domain types, run the matching
//! pipeline component, and map domain errors onto gRPC status codes:
//! bad request data becomes `InvalidArgument`, chat model failures become
//! `Unavailable`, everything else is `Internal`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};

use daybook_analysis::{AnalysisError, DiaryAnalyzer, SummaryService};
use daybook_embeddings::EmbeddingModel;
use daybook_llm::ChatModel;
use daybook_merge::{MergeEngine, MergeError, MergeOptions, StyleContext};
use daybook_style::{extract_style, StyleError, StyleProfiler};
use daybook_types::{Memo, StyleProfile, StyleVector};

use crate::pb::{
    diary_service_server::DiaryService, AnalyzeDiaryRequest, AnalyzeDiaryResponse,
    DiaryAnalysisSummary, DiaryReport, ExtractStyleRequest, ExtractStyleResponse,
    Highlight as ProtoHighlight, Memo as ProtoMemo, MergeDiaryRequest, MergeDiaryResponse,
    MergeToken, MonthSummary as ProtoMonthSummary, SummarizeMonthRequest, SummarizeWeekRequest,
    WeekSummary as ProtoWeekSummary,
};

/// Channel capacity for streamed merge tokens.
const STREAM_BUFFER: usize = 32;

/// Minimum diaries required to extract a style signature.
///
/// Below this the aggregate vector reflects single-entry noise rather
/// than a stable writing voice.
const MIN_STYLE_DIARIES: usize = 3;

/// Implementation of the DiaryService gRPC service.
pub struct DiaryServiceImpl {
    embedder: Arc<dyn EmbeddingModel>,
    profiler: StyleProfiler,
    engine: Arc<MergeEngine>,
    analyzer: DiaryAnalyzer,
    summaries: SummaryService,
}

impl DiaryServiceImpl {
    /// Create a new DiaryServiceImpl over the given model handles.
    pub fn new(
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn EmbeddingModel>,
        options: MergeOptions,
    ) -> Self {
        Self {
            embedder: embedder.clone(),
            profiler: StyleProfiler::new(chat.clone()),
            engine: Arc::new(MergeEngine::new(chat.clone(), embedder, options)),
            analyzer: DiaryAnalyzer::new(chat.clone()),
            summaries: SummaryService::new(chat),
        }
    }

    fn parse_merge_request(req: &MergeDiaryRequest) -> Result<(Vec<Memo>, StyleContext), Status> {
        if req.memos.is_empty() {
            return Err(Status::invalid_argument("at least 1 memo is required"));
        }

        let memos = req
            .memos
            .iter()
            .map(|m| Memo::new(m.id, &m.content, m.order))
            .collect();

        let style = StyleContext {
            profile: StyleProfile::from_model_reply(&req.style_profile),
            examples: req.style_examples.clone(),
            vector: StyleVector::new(req.style_vector.clone()),
        };

        Ok((memos, style))
    }
}

fn style_status(err: StyleError) -> Status {
    match err {
        StyleError::EmptyDiary | StyleError::InvalidInput(_) => {
            Status::invalid_argument(err.to_string())
        }
        StyleError::Chat(_) => Status::unavailable(err.to_string()),
        StyleError::Embedding(_) => Status::internal(err.to_string()),
    }
}

fn merge_status(err: MergeError) -> Status {
    match err {
        MergeError::InvalidInput(_) => Status::invalid_argument(err.to_string()),
        MergeError::Chat(_) => Status::unavailable(err.to_string()),
        MergeError::Embedding(_) => Status::internal(err.to_string()),
        MergeError::Cancelled => Status::cancelled(err.to_string()),
    }
}

fn analysis_status(err: AnalysisError) -> Status {
    match err {
        AnalysisError::InvalidInput(_) => Status::invalid_argument(err.to_string()),
        AnalysisError::Chat(_) => Status::unavailable(err.to_string()),
        AnalysisError::Parse(_) => Status::internal(err.to_string()),
    }
}

fn week_to_proto(week: daybook_types::WeekSummary) -> ProtoWeekSummary {
    ProtoWeekSummary {
        title: week.title,
        overview: week.overview,
        emerging_topics: week.emerging_topics,
        trend: week.trend,
        dominant_emoji: week.dominant_emoji,
        highlights: week
            .highlights
            .into_iter()
            .map(|h| ProtoHighlight {
                date: h.date,
                summary: h.summary,
            })
            .collect(),
        emotion_cycle: week.emotion_cycle,
        advice: week.advice,
    }
}

fn week_from_proto(week: ProtoWeekSummary) -> daybook_types::WeekSummary {
    daybook_types::WeekSummary {
        title: week.title,
        overview: week.overview,
        emerging_topics: week.emerging_topics,
        trend: week.trend,
        dominant_emoji: week.dominant_emoji,
        highlights: week
            .highlights
            .into_iter()
            .map(|h| daybook_types::Highlight {
                date: h.date,
                summary: h.summary,
            })
            .collect(),
        emotion_cycle: week.emotion_cycle,
        advice: week.advice,
    }
}

#[tonic::async_trait]
impl DiaryService for DiaryServiceImpl {
    async fn extract_style(
        &self,
        request: Request<ExtractStyleRequest>,
    ) -> Result<Response<ExtractStyleResponse>, Status> {
        let req = request.into_inner();
        if req.diaries.len() < MIN_STYLE_DIARIES {
            return Err(Status::invalid_argument(format!(
                "at least {} diaries are required",
                MIN_STYLE_DIARIES
            )));
        }

        info!(diaries = req.diaries.len(), "ExtractStyle request");

        let signature = extract_style(&self.embedder, &self.profiler, &req.diaries)
            .await
            .map_err(style_status)?;

        Ok(Response::new(ExtractStyleResponse {
            style_vector: signature.vector.0,
            style_examples: signature.examples,
            style_profile: signature.profile.0.to_string(),
        }))
    }

    async fn merge_diary(
        &self,
        request: Request<MergeDiaryRequest>,
    ) -> Result<Response<MergeDiaryResponse>, Status> {
        let req = request.into_inner();
        let (memos, style) = Self::parse_merge_request(&req)?;

        info!(
            memos = memos.len(),
            end_flag = req.end_flag,
            "MergeDiary request"
        );

        let merged = self
            .engine
            .merge(&memos, &style)
            .await
            .map_err(merge_status)?;

        let report = if req.end_flag {
            let analysis = self
                .analyzer
                .analyze(&merged)
                .await
                .map_err(analysis_status)?;
            Some(DiaryReport {
                entry_date: req.entry_date,
                user_id: req.user_id,
                diary: merged.clone(),
                icon: analysis.emoji,
                ai_comment: analysis.feedback,
                analysis: Some(DiaryAnalysisSummary {
                    keywords: analysis.keywords,
                    emotion_score: analysis.emotion_score,
                }),
            })
        } else {
            None
        };

        Ok(Response::new(MergeDiaryResponse {
            merged_content: merged,
            report,
        }))
    }

    type MergeDiaryStreamStream = ReceiverStream<Result<MergeToken, Status>>;

    async fn merge_diary_stream(
        &self,
        request: Request<MergeDiaryRequest>,
    ) -> Result<Response<Self::MergeDiaryStreamStream>, Status> {
        let req = request.into_inner();
        let (memos, style) = Self::parse_merge_request(&req)?;

        info!(memos = memos.len(), "MergeDiaryStream request");

        let (out_tx, out_rx) = mpsc::channel(STREAM_BUFFER);
        let (token_tx, mut token_rx) = mpsc::channel::<String>(STREAM_BUFFER);

        // Forward engine tokens to the response stream. Dropping the
        // forwarder's sender when the client goes away closes token_rx,
        // which cancels the engine run.
        let forward_tx = out_tx.clone();
        tokio::spawn(async move {
            while let Some(text) = token_rx.recv().await {
                if forward_tx.send(Ok(MergeToken { text })).await.is_err() {
                    break;
                }
            }
        });

        let engine = self.engine.clone();
        tokio::spawn(async move {
            match engine.merge_stream(&memos, &style, token_tx).await {
                Ok(_) => {}
                Err(MergeError::Cancelled) => {
                    warn!("Streaming merge cancelled by client");
                }
                Err(e) => {
                    error!(error = %e, "Streaming merge failed");
                    let _ = out_tx.send(Err(merge_status(e))).await;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(out_rx)))
    }

    async fn analyze_diary(
        &self,
        request: Request<AnalyzeDiaryRequest>,
    ) -> Result<Response<AnalyzeDiaryResponse>, Status> {
        let req = request.into_inner();

        let analysis = self
            .analyzer
            .analyze(&req.diary)
            .await
            .map_err(analysis_status)?;

        Ok(Response::new(AnalyzeDiaryResponse {
            keywords: analysis.keywords,
            emoji: analysis.emoji,
            emotion_score: analysis.emotion_score,
            feedback: analysis.feedback,
        }))
    }

    async fn summarize_week(
        &self,
        request: Request<SummarizeWeekRequest>,
    ) -> Result<Response<ProtoWeekSummary>, Status> {
        let req = request.into_inner();

        let summary = self
            .summaries
            .summarize_week(&req.diaries)
            .await
            .map_err(analysis_status)?;

        Ok(Response::new(week_to_proto(summary)))
    }

    async fn summarize_month(
        &self,
        request: Request<SummarizeMonthRequest>,
    ) -> Result<Response<ProtoMonthSummary>, Status> {
        let req = request.into_inner();
        let weeks: Vec<_> = req.weeks.into_iter().map(week_from_proto).collect();

        let summary = self
            .summaries
            .summarize_month(&weeks)
            .await
            .map_err(analysis_status)?;

        Ok(Response::new(ProtoMonthSummary {
            title: summary.title,
            overview: summary.overview,
            dominant_emoji: summary.dominant_emoji,
            emerging_topics: summary.emerging_topics,
            emotion_cycle: summary.emotion_cycle,
            advice: summary.advice,
        }))
    }
}
