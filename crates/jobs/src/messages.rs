//! Wire types for the job service.
//!
//! Every request is `{"type": ..., "payload": {...}}` posted to the same
//! endpoint. Replies share an envelope with an optional numeric `status`
//! and an optional `data` object whose shape depends on the request type.

use serde::{Deserialize, Serialize};

use panelsmith_core::model::ImageKind;

/// Arguments appended to every generate prompt: model version 7, portrait
/// 2:3 aspect ratio.
pub const GENERATE_ARGS: &str = "--v 7 --ar 2:3";

/// Status string reported once the candidate grid exists.
pub const STATUS_READY: &str = "ready";

/// `status` value acknowledging an upscale request.
pub const UPSCALE_ACCEPTED: i64 = 0;

/// A request to the job service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum JobRequest {
    Generate {
        prompt: String,
        args: String,
    },
    Upscale {
        index: u8,
        image_hash: String,
        message_id: String,
    },
    Query {
        id: String,
    },
}

impl JobRequest {
    pub fn generate(prompt: impl Into<String>) -> Self {
        Self::Generate {
            prompt: prompt.into(),
            args: GENERATE_ARGS.to_string(),
        }
    }

    pub fn query(id: impl Into<String>) -> Self {
        Self::Query { id: id.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
            Self::Upscale { .. } => "upscale",
            Self::Query { .. } => "query",
        }
    }
}

/// Reply envelope shared by all request types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JobReply {
    /// Job id assigned by a generate request (`data.id`).
    pub fn job_id(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .get("id")?
            .as_str()
            .filter(|id| !id.is_empty())
    }

    pub fn upscale_accepted(&self) -> bool {
        self.status == Some(UPSCALE_ACCEPTED)
    }

    /// Status snapshot carried by a query reply.
    pub fn snapshot(&self) -> Option<Result<JobSnapshot, serde_json::Error>> {
        self.data
            .as_ref()
            .map(|data| serde_json::from_value(data.clone()))
    }
}

/// One image produced by a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobImage {
    pub url: String,
    #[serde(default)]
    pub image_hash: String,
    #[serde(default)]
    pub message_id: String,
}

/// A job's state as reported by a query.
///
/// `images[0]` is the candidate grid; `images[1]`, when present, is the
/// upscaled pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub images: Vec<JobImage>,
    /// Set by the service while an upscale is still rendering.
    #[serde(default)]
    pub loading: Option<serde_json::Value>,
}

impl JobSnapshot {
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_READY
    }

    pub fn is_loading(&self) -> bool {
        match &self.loading {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// The candidate grid whose hash and message id drive upscaling.
    pub fn grid(&self) -> Option<&JobImage> {
        self.images.first()
    }

    /// Image to keep as a character reference: the upscaled pick when
    /// present, otherwise the grid.
    pub fn best_image(&self) -> Option<(&JobImage, ImageKind)> {
        match (self.upscaled(), self.grid()) {
            (Some(upscaled), _) => Some((upscaled, ImageKind::Upscale)),
            (None, Some(grid)) => Some((grid, ImageKind::Generate)),
            (None, None) => None,
        }
    }

    /// The upscaled pick, once the service has attached it.
    pub fn upscaled(&self) -> Option<&JobImage> {
        self.images.get(1)
    }
}
