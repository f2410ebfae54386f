use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finalized visitor pass produced by one successful form submission.
///
/// Records are immutable once created; a new submission replaces the
/// previous record wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassRecord {
    /// Pass ID in format: "RGS" + 6 digits
    pub id: String,
    /// Visitor name, copied verbatim from the draft
    pub name: String,
    /// Visit date (YYYY-MM-DD, as entered)
    pub date: String,
    /// Visit time rendered for the pass (12-hour clock, e.g. "2:30 PM")
    pub time: String,
    /// Contact phone number, copied verbatim from the draft
    pub phone: String,
    /// Visitor photo as a data URL
    pub photo: Option<String>,
}

impl PassRecord {
    /// Generate a pass ID from a unit-interval random draw.
    ///
    /// The numeric part is uniform over [100000, 999999]; draws outside
    /// [0, 1) are clamped into range rather than rejected.
    pub fn generate_id(draw: f64) -> String {
        let draw = if draw.is_finite() {
            draw.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let number = 100_000 + ((draw * 900_000.0) as u32).min(899_999);
        format!("RGS{}", number)
    }

    /// Parse a pass ID back into its numeric part.
    pub fn parse_id(id: &str) -> Result<u32, PassIdError> {
        let digits = id.strip_prefix("RGS").ok_or(PassIdError::InvalidFormat)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PassIdError::InvalidFormat);
        }
        let number: u32 = digits.parse().map_err(|_| PassIdError::InvalidFormat)?;
        if !(100_000..=999_999).contains(&number) {
            return Err(PassIdError::OutOfRange);
        }
        Ok(number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassIdError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for PassIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassIdError::InvalidFormat => write!(f, "Invalid pass ID format"),
            PassIdError::OutOfRange => write!(f, "Pass ID number out of range"),
        }
    }
}

impl std::error::Error for PassIdError {}

/// Render a 24-hour "HH:MM" time as a 12-hour clock string ("2:30 PM").
///
/// Seconds are accepted and dropped. Unparseable input passes through
/// unchanged so callers stay total over arbitrary field contents.
pub fn format_time_12h(time: &str) -> String {
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"));
    match parsed {
        Ok(t) => t.format("%-I:%M %p").to_string(),
        Err(_) => time.to_string(),
    }
}

/// Phase of the photo-acquisition sub-flow.
///
/// A media stream is held by the frontend exactly while the phase is
/// `Live`; every transition out of `Live` tells the caller to release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraPhase {
    /// No photo, no capture session
    Idle,
    /// Camera permission requested, stream not yet delivered
    Requesting,
    /// Live capture session open, stream held by the caller
    Live,
    /// A photo is stored and no capture session is open
    Captured,
}

/// Explicit state machine for the camera/photo sub-flow.
///
/// Owns the photo payload so that the settled phases stay consistent:
/// outside an open session, the phase is `Captured` exactly when a photo
/// is stored. The photo survives a re-acquisition (retake) that gets
/// cancelled or denied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFlow {
    phase: CameraPhase,
    photo: Option<String>,
}

impl CameraFlow {
    pub fn new() -> Self {
        Self {
            phase: CameraPhase::Idle,
            photo: None,
        }
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    /// The stored photo, captured or uploaded, as a data URL.
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// True while a live capture session is open (a stream is held).
    pub fn is_live(&self) -> bool {
        self.phase == CameraPhase::Live
    }

    /// True from the permission request until the session settles.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, CameraPhase::Requesting | CameraPhase::Live)
    }

    /// Begin a camera permission request.
    pub fn start_request(&mut self) -> Result<(), CameraFlowError> {
        match self.phase {
            CameraPhase::Idle | CameraPhase::Captured => {
                self.phase = CameraPhase::Requesting;
                Ok(())
            }
            CameraPhase::Requesting | CameraPhase::Live => {
                Err(CameraFlowError::CaptureInProgress)
            }
        }
    }

    /// The pending permission request resolved with a live stream.
    ///
    /// Errors when no request is pending (the user cancelled before the
    /// prompt resolved); the caller must release the stream it was just
    /// handed instead of attaching it.
    pub fn stream_granted(&mut self) -> Result<(), CameraFlowError> {
        match self.phase {
            CameraPhase::Requesting => {
                self.phase = CameraPhase::Live;
                Ok(())
            }
            _ => Err(CameraFlowError::NoPendingRequest),
        }
    }

    /// The pending permission request failed (denied or hardware error).
    pub fn stream_denied(&mut self) -> Result<(), CameraFlowError> {
        match self.phase {
            CameraPhase::Requesting => {
                self.phase = self.settled_phase();
                Ok(())
            }
            _ => Err(CameraFlowError::NoPendingRequest),
        }
    }

    /// Store a captured frame and close the session.
    ///
    /// Valid only while `Live`; the caller must release the stream it
    /// holds after this returns.
    pub fn capture_frame(&mut self, photo: String) -> Result<(), CameraFlowError> {
        match self.phase {
            CameraPhase::Live => {
                self.photo = Some(photo);
                self.phase = CameraPhase::Captured;
                Ok(())
            }
            _ => Err(CameraFlowError::NotLive),
        }
    }

    /// Close the capture session. Idempotent: safe to call in any phase.
    ///
    /// Returns true when a live stream was held and must now be released.
    pub fn cancel(&mut self) -> bool {
        let stream_held = self.phase == CameraPhase::Live;
        if self.is_busy() {
            self.phase = self.settled_phase();
        }
        stream_held
    }

    /// Accept an uploaded photo. Rejected while a capture session is open.
    pub fn set_photo(&mut self, photo: String) -> Result<(), CameraFlowError> {
        if self.is_busy() {
            return Err(CameraFlowError::CaptureInProgress);
        }
        self.photo = Some(photo);
        self.phase = CameraPhase::Captured;
        Ok(())
    }

    /// Drop the stored photo. Does not touch an open capture session.
    pub fn clear_photo(&mut self) {
        self.photo = None;
        if self.phase == CameraPhase::Captured {
            self.phase = CameraPhase::Idle;
        }
    }

    fn settled_phase(&self) -> CameraPhase {
        if self.photo.is_some() {
            CameraPhase::Captured
        } else {
            CameraPhase::Idle
        }
    }
}

impl Default for CameraFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraFlowError {
    /// A permission request or live session is already open
    CaptureInProgress,
    /// A stream resolution arrived with no request pending
    NoPendingRequest,
    /// Frame capture attempted outside a live session
    NotLive,
}

impl fmt::Display for CameraFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFlowError::CaptureInProgress => {
                write!(f, "A capture session is already in progress")
            }
            CameraFlowError::NoPendingRequest => {
                write!(f, "No camera request is pending")
            }
            CameraFlowError::NotLive => write!(f, "No live capture session is open"),
        }
    }
}

impl std::error::Error for CameraFlowError {}

/// In-progress visitor details collected before submission.
///
/// Created once at mount, seeded with the mount-time date and time, and
/// only discarded by a full page reload. Submission never resets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPass {
    pub name: String,
    /// Visit date (YYYY-MM-DD)
    pub date: String,
    /// Visit time (24-hour HH:MM)
    pub time: String,
    pub phone: String,
    /// Photo acquisition sub-state
    pub camera: CameraFlow,
}

impl DraftPass {
    /// Create a draft seeded with the mount-time date and time.
    pub fn new(date: String, time: String) -> Self {
        Self {
            name: String::new(),
            date,
            time,
            phone: String::new(),
            camera: CameraFlow::new(),
        }
    }

    /// Finalize the draft into a pass record.
    ///
    /// `id_draw` is a unit-interval random draw supplied by the caller.
    /// Fails when no photo has been captured or uploaded; the draft is
    /// left untouched either way.
    pub fn submit(&self, id_draw: f64) -> Result<PassRecord, SubmitError> {
        let photo = self.camera.photo().ok_or(SubmitError::MissingPhoto)?;
        Ok(PassRecord {
            id: PassRecord::generate_id(id_draw),
            name: self.name.clone(),
            date: self.date.clone(),
            time: format_time_12h(&self.time),
            phone: self.phone.clone(),
            photo: Some(photo.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    MissingPhoto,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::MissingPhoto => {
                write!(f, "Please upload or capture a photo first")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_photo() -> DraftPass {
        let mut draft = DraftPass::new("2026-01-15".to_string(), "14:30".to_string());
        draft.name = "Jane Doe".to_string();
        draft.phone = "5551234".to_string();
        draft
            .camera
            .set_photo("data:image/png;base64,AAAA".to_string())
            .unwrap();
        draft
    }

    #[test]
    fn test_generate_id_format() {
        let draws = [0.0, 0.25, 0.5, 0.731, 0.999999];
        for draw in draws {
            let id = PassRecord::generate_id(draw);
            assert!(id.starts_with("RGS"), "id should start with RGS: {}", id);
            assert_eq!(id.len(), 9, "RGS plus six digits: {}", id);
            let number = PassRecord::parse_id(&id).unwrap();
            assert!((100_000..=999_999).contains(&number), "out of range: {}", id);
        }
    }

    #[test]
    fn test_generate_id_boundaries() {
        assert_eq!(PassRecord::generate_id(0.0), "RGS100000");
        assert_eq!(PassRecord::generate_id(1.0), "RGS999999");
        // Out-of-range and non-finite draws clamp instead of panicking
        assert_eq!(PassRecord::generate_id(-3.0), "RGS100000");
        assert_eq!(PassRecord::generate_id(17.0), "RGS999999");
        assert_eq!(PassRecord::generate_id(f64::NAN), "RGS100000");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(PassRecord::parse_id("RGS123456").unwrap(), 123456);
        assert_eq!(PassRecord::parse_id("RGS100000").unwrap(), 100_000);
        assert_eq!(PassRecord::parse_id("RGS999999").unwrap(), 999_999);

        assert_eq!(
            PassRecord::parse_id("123456"),
            Err(PassIdError::InvalidFormat)
        );
        assert_eq!(
            PassRecord::parse_id("RGS12345"),
            Err(PassIdError::InvalidFormat)
        );
        assert_eq!(
            PassRecord::parse_id("RGS1234567"),
            Err(PassIdError::InvalidFormat)
        );
        assert_eq!(
            PassRecord::parse_id("RGSabcdef"),
            Err(PassIdError::InvalidFormat)
        );
        assert_eq!(
            PassRecord::parse_id("RGS099999"),
            Err(PassIdError::OutOfRange)
        );
    }

    #[test]
    fn test_format_time_12h() {
        assert_eq!(format_time_12h("14:30"), "2:30 PM");
        assert_eq!(format_time_12h("09:05"), "9:05 AM");
        assert_eq!(format_time_12h("00:05"), "12:05 AM");
        assert_eq!(format_time_12h("12:00"), "12:00 PM");
        assert_eq!(format_time_12h("23:59"), "11:59 PM");
        assert_eq!(format_time_12h("14:30:45"), "2:30 PM");
    }

    #[test]
    fn test_format_time_12h_passthrough() {
        // Unparseable input is returned unchanged, never an error
        assert_eq!(format_time_12h(""), "");
        assert_eq!(format_time_12h("not a time"), "not a time");
        assert_eq!(format_time_12h("25:99"), "25:99");
    }

    #[test]
    fn test_submit_without_photo_fails() {
        let mut draft = DraftPass::new("2026-01-15".to_string(), "14:30".to_string());
        draft.name = "Jane Doe".to_string();
        draft.phone = "5551234".to_string();

        let before = draft.clone();
        assert_eq!(draft.submit(0.5), Err(SubmitError::MissingPhoto));
        assert_eq!(draft, before, "failed submit must not change the draft");
    }

    #[test]
    fn test_submit_produces_record() {
        let draft = draft_with_photo();
        let record = draft.submit(0.5).unwrap();

        assert!(PassRecord::parse_id(&record.id).is_ok());
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.date, "2026-01-15");
        assert_eq!(record.time, "2:30 PM");
        assert_eq!(record.phone, "5551234");
        assert_eq!(
            record.photo.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_submit_does_not_reset_draft() {
        let draft = draft_with_photo();
        let before = draft.clone();
        draft.submit(0.1).unwrap();
        assert_eq!(draft, before);
    }

    #[test]
    fn test_camera_capture_closes_session() {
        let mut flow = CameraFlow::new();
        flow.start_request().unwrap();
        flow.stream_granted().unwrap();
        assert!(flow.is_live());

        flow.capture_frame("data:image/png;base64,BBBB".to_string())
            .unwrap();
        assert_eq!(flow.phase(), CameraPhase::Captured);
        assert!(!flow.is_live());
        assert!(flow.has_photo());
    }

    #[test]
    fn test_camera_cancel_is_idempotent() {
        let mut flow = CameraFlow::new();
        assert!(!flow.cancel(), "no stream held while idle");
        assert_eq!(flow.phase(), CameraPhase::Idle);

        flow.start_request().unwrap();
        assert!(!flow.cancel(), "no stream held before the grant");
        assert_eq!(flow.phase(), CameraPhase::Idle);

        flow.start_request().unwrap();
        flow.stream_granted().unwrap();
        assert!(flow.cancel(), "live stream must be released");
        assert!(!flow.cancel(), "second cancel is a no-op");
    }

    #[test]
    fn test_camera_cancel_keeps_prior_photo() {
        let mut flow = CameraFlow::new();
        flow.set_photo("data:image/png;base64,CCCC".to_string())
            .unwrap();

        // Retake: open a session on top of an existing photo, then cancel
        flow.start_request().unwrap();
        flow.stream_granted().unwrap();
        assert!(flow.cancel());
        assert_eq!(flow.phase(), CameraPhase::Captured);
        assert_eq!(flow.photo(), Some("data:image/png;base64,CCCC"));
    }

    #[test]
    fn test_camera_denied_settles_by_photo() {
        let mut flow = CameraFlow::new();
        flow.start_request().unwrap();
        flow.stream_denied().unwrap();
        assert_eq!(flow.phase(), CameraPhase::Idle);

        flow.set_photo("data:image/png;base64,DDDD".to_string())
            .unwrap();
        flow.start_request().unwrap();
        flow.stream_denied().unwrap();
        assert_eq!(flow.phase(), CameraPhase::Captured);
    }

    #[test]
    fn test_camera_late_grant_is_rejected() {
        let mut flow = CameraFlow::new();
        flow.start_request().unwrap();
        flow.cancel();

        // The permission prompt resolved after the user cancelled; the
        // caller is told to discard the stream it was handed.
        assert_eq!(
            flow.stream_granted(),
            Err(CameraFlowError::NoPendingRequest)
        );
        assert_eq!(flow.phase(), CameraPhase::Idle);
    }

    #[test]
    fn test_camera_invalid_transitions() {
        let mut flow = CameraFlow::new();
        assert_eq!(
            flow.stream_granted(),
            Err(CameraFlowError::NoPendingRequest)
        );
        assert_eq!(
            flow.stream_denied(),
            Err(CameraFlowError::NoPendingRequest)
        );
        assert_eq!(
            flow.capture_frame("x".to_string()),
            Err(CameraFlowError::NotLive)
        );

        flow.start_request().unwrap();
        assert_eq!(
            flow.start_request(),
            Err(CameraFlowError::CaptureInProgress)
        );
        assert_eq!(
            flow.set_photo("x".to_string()),
            Err(CameraFlowError::CaptureInProgress)
        );
        assert_eq!(
            flow.capture_frame("x".to_string()),
            Err(CameraFlowError::NotLive)
        );

        flow.stream_granted().unwrap();
        assert_eq!(
            flow.start_request(),
            Err(CameraFlowError::CaptureInProgress)
        );
        assert_eq!(
            flow.set_photo("x".to_string()),
            Err(CameraFlowError::CaptureInProgress)
        );
    }

    #[test]
    fn test_camera_clear_photo() {
        let mut flow = CameraFlow::new();
        flow.set_photo("data:image/png;base64,EEEE".to_string())
            .unwrap();
        flow.clear_photo();
        assert_eq!(flow.phase(), CameraPhase::Idle);
        assert!(!flow.has_photo());

        // Clearing mid-session drops the photo but leaves the session open
        flow.set_photo("data:image/png;base64,FFFF".to_string())
            .unwrap();
        flow.start_request().unwrap();
        flow.stream_granted().unwrap();
        flow.clear_photo();
        assert!(flow.is_live());
        assert!(!flow.has_photo());
        assert!(flow.cancel());
        assert_eq!(flow.phase(), CameraPhase::Idle);
    }

    #[test]
    fn test_record_serializes_with_stable_field_names() {
        let record = draft_with_photo().submit(0.0).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        for field in ["\"id\"", "\"name\"", "\"date\"", "\"time\"", "\"phone\"", "\"photo\""] {
            assert!(json.contains(field), "missing {} in {}", field, json);
        }
    }
}
