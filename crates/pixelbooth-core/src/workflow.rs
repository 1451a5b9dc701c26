//! The booth workflow: which state the booth is in, which image it
//! holds, and which transitions are allowed.
//!
//! ```text
//! ready ──acquire──▶ selected ──begin──▶ detecting ──detected──▶ converting ──converted──▶ complete
//!   ▲                   │                    │                       │                        │
//!   │                   │                    └──────fail─────┐       └────────fail───────┐    │
//!   │                   ▼                                    ▼                           ▼    ▼
//!   └──────────────── reset ◀──────────────────────────── failed ◀───────────────────────┘  reset
//! ```
//!
//! In-flight states (`detecting`, `converting`) cannot be reset: the
//! remote calls are not cancellable.

use std::fmt;

use crate::conversion::{
    Conversion, ConversionError, ConversionService, ConversionStage, Converted, Detected, Pending,
};
use crate::data_url::DataUrl;
use crate::types::BoothVariant;

/// Where the booth is in its capture → detect → convert pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    /// Waiting for a photo.
    Ready,
    /// A photo was captured or uploaded and awaits confirmation.
    Selected,
    /// Waiting on the detect call.
    Detecting,
    /// Waiting on the convert call.
    Converting,
    /// The pixel portrait is displayed.
    Complete,
    /// A remote step failed; only a reset leaves this state.
    Failed {
        /// The step that failed.
        stage: ConversionStage,
    },
}

impl WorkflowState {
    /// The successful forward path, in order.
    pub const FORWARD: [Self; 5] = [
        Self::Ready,
        Self::Selected,
        Self::Detecting,
        Self::Converting,
        Self::Complete,
    ];

    /// Display label for the state.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Selected => "Selected",
            Self::Detecting => "Detecting",
            Self::Converting => "Converting",
            Self::Complete => "Complete",
            Self::Failed { .. } => "Failed",
        }
    }

    /// Whether a remote call is outstanding.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Detecting | Self::Converting)
    }

    /// Whether [`Booth::reset`] is offered from this state.
    #[must_use]
    pub const fn can_reset(self) -> bool {
        matches!(
            self,
            Self::Selected | Self::Complete | Self::Failed { .. }
        )
    }

    /// Progress bar value (out of 100) for in-flight states.
    #[must_use]
    pub const fn progress(self) -> Option<u8> {
        match self {
            Self::Detecting => Some(25),
            Self::Converting => Some(65),
            _ => None,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { stage } => write!(f, "Failed ({stage})"),
            _ => f.write_str(self.label()),
        }
    }
}

/// Actions that move the booth between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A photo was captured or uploaded.
    Acquire,
    /// The user started the conversion.
    Begin,
    /// The detect call returned.
    Detected,
    /// The convert call returned.
    Converted,
    /// A remote call failed.
    Fail,
    /// The user went back to the start.
    Reset,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Acquire => "acquire",
            Self::Begin => "begin",
            Self::Detected => "detected",
            Self::Converted => "converted",
            Self::Fail => "fail",
            Self::Reset => "reset",
        })
    }
}

/// Errors returned by booth transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoothError {
    /// The action is not valid from the current state. The state is
    /// left unchanged.
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        /// State the booth was in.
        from: WorkflowState,
        /// Action that was attempted.
        action: Action,
    },

    /// A remote step failed. The booth is now [`WorkflowState::Failed`].
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// One booth instance: the current state and the current image.
///
/// The image is replaced wholesale at each step: the capture, then the
/// cropped face, then the pixel portrait. It is `None` only in
/// [`WorkflowState::Ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booth {
    variant: BoothVariant,
    state: WorkflowState,
    image: Option<DataUrl>,
}

impl Booth {
    /// A booth in the `ready` state with no image.
    #[must_use]
    pub const fn new(variant: BoothVariant) -> Self {
        Self {
            variant,
            state: WorkflowState::Ready,
            image: None,
        }
    }

    /// The booth variant.
    #[must_use]
    pub const fn variant(&self) -> BoothVariant {
        self.variant
    }

    /// The current workflow state.
    #[must_use]
    pub const fn state(&self) -> WorkflowState {
        self.state
    }

    /// The current image, if any.
    #[must_use]
    pub const fn image(&self) -> Option<&DataUrl> {
        self.image.as_ref()
    }

    /// Accept a captured or uploaded photo: `ready → selected`.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless the booth is
    /// `ready`.
    pub fn acquire(&mut self, image: DataUrl) -> Result<(), BoothError> {
        self.require(WorkflowState::Ready, Action::Acquire)?;
        self.image = Some(image);
        self.enter(WorkflowState::Selected);
        Ok(())
    }

    /// Drop the image and return to `ready`.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] from `ready`,
    /// `detecting`, and `converting`.
    pub fn reset(&mut self) -> Result<(), BoothError> {
        if !self.state.can_reset() {
            return Err(self.invalid(Action::Reset));
        }
        self.image = None;
        self.enter(WorkflowState::Ready);
        Ok(())
    }

    /// Start converting the current image: `selected → detecting`.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless the booth is
    /// `selected`.
    pub fn begin(&mut self) -> Result<Pending, BoothError> {
        let source = self.selected_image(Action::Begin)?.clone();
        self.enter(WorkflowState::Detecting);
        Ok(Conversion::new(source))
    }

    /// Like [`begin`](Self::begin), but send `snapshot` (typically the
    /// rendered viewport) to detection instead of the raw image.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless the booth is
    /// `selected`.
    pub fn begin_with(&mut self, snapshot: DataUrl) -> Result<Pending, BoothError> {
        self.selected_image(Action::Begin)?;
        self.enter(WorkflowState::Detecting);
        Ok(Conversion::new(snapshot))
    }

    /// Record the detect result: `detecting → converting`, image becomes
    /// the cropped face.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless the booth is
    /// `detecting`.
    pub fn detected(&mut self, stage: &Detected) -> Result<(), BoothError> {
        self.require(WorkflowState::Detecting, Action::Detected)?;
        self.image = Some(stage.cropped_face().clone());
        self.enter(WorkflowState::Converting);
        Ok(())
    }

    /// Record the convert result: `converting → complete`, image becomes
    /// the pixel portrait.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless the booth is
    /// `converting`.
    pub fn converted(&mut self, stage: &Converted) -> Result<(), BoothError> {
        self.require(WorkflowState::Converting, Action::Converted)?;
        self.image = Some(stage.pixel_face().clone());
        self.enter(WorkflowState::Complete);
        Ok(())
    }

    /// Record a failed remote step. The last good image is kept.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless a remote call is
    /// in flight.
    pub fn fail(&mut self, error: &ConversionError) -> Result<(), BoothError> {
        if !self.state.is_in_flight() {
            return Err(self.invalid(Action::Fail));
        }
        tracing::warn!(%error, "conversion failed");
        self.enter(WorkflowState::Failed {
            stage: error.stage(),
        });
        Ok(())
    }

    /// Run both remote steps on the current image: `selected → complete`.
    ///
    /// Intended for callers that own the booth for the whole conversion
    /// (tests, the CLI). UI code that must render between the two calls
    /// drives [`begin`](Self::begin), [`detected`](Self::detected), and
    /// [`converted`](Self::converted) itself.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidTransition`] unless the booth is
    /// `selected`, and [`BoothError::Conversion`] if a remote step fails,
    /// in which case the booth is left in [`WorkflowState::Failed`].
    pub async fn advance<S>(&mut self, service: &S) -> Result<(), BoothError>
    where
        S: ConversionService + ?Sized,
    {
        let pending = self.begin()?;
        self.drive(pending, service).await
    }

    /// Like [`advance`](Self::advance), but detect on `snapshot`.
    ///
    /// # Errors
    ///
    /// Same as [`advance`](Self::advance).
    pub async fn advance_with<S>(&mut self, snapshot: DataUrl, service: &S) -> Result<(), BoothError>
    where
        S: ConversionService + ?Sized,
    {
        let pending = self.begin_with(snapshot)?;
        self.drive(pending, service).await
    }

    async fn drive<S>(&mut self, pending: Pending, service: &S) -> Result<(), BoothError>
    where
        S: ConversionService + ?Sized,
    {
        let detected = match pending.detect(service).await {
            Ok(detected) => detected,
            Err(e) => return Err(self.record_failure(e)),
        };
        self.detected(&detected)?;

        let converted = match detected.convert(service).await {
            Ok(converted) => converted,
            Err(e) => return Err(self.record_failure(e)),
        };
        self.converted(&converted)
    }

    fn record_failure(&mut self, error: ConversionError) -> BoothError {
        if let Err(e) = self.fail(&error) {
            return e;
        }
        BoothError::Conversion(error)
    }

    fn selected_image(&self, action: Action) -> Result<&DataUrl, BoothError> {
        self.require(WorkflowState::Selected, action)?;
        self.image.as_ref().ok_or_else(|| self.invalid(action))
    }

    fn require(&self, state: WorkflowState, action: Action) -> Result<(), BoothError> {
        if self.state == state {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    const fn invalid(&self, action: Action) -> BoothError {
        BoothError::InvalidTransition {
            from: self.state,
            action,
        }
    }

    fn enter(&mut self, next: WorkflowState) {
        tracing::debug!(from = %self.state, to = %next, "booth transition");
        self.state = next;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conversion::ServiceError;
    use crate::conversion::testing::ScriptedService;

    fn photo() -> DataUrl {
        DataUrl::parse("data:image/png;base64,UEhPVE8=").unwrap()
    }

    fn selected() -> Booth {
        let mut booth = Booth::new(BoothVariant::Passport);
        booth.acquire(photo()).unwrap();
        booth
    }

    #[test]
    fn new_booth_is_ready_and_empty() {
        let booth = Booth::new(BoothVariant::Sing);
        assert_eq!(booth.state(), WorkflowState::Ready);
        assert!(booth.image().is_none());
        assert_eq!(booth.variant(), BoothVariant::Sing);
    }

    #[test]
    fn upload_and_capture_share_one_entry_point() {
        // Uploads arrive as whatever the file was; captures as PNG.
        for url in [
            "data:image/jpeg;base64,/9j/4AAQ",
            "data:image/png;base64,iVBORw0KGgo=",
        ] {
            let mut booth = Booth::new(BoothVariant::Passport);
            booth.acquire(DataUrl::parse(url).unwrap()).unwrap();
            assert_eq!(booth.state(), WorkflowState::Selected);
            assert!(!booth.image().unwrap().payload().is_empty());
        }
    }

    #[test]
    fn acquire_twice_is_rejected() {
        let mut booth = selected();
        let err = booth.acquire(photo()).unwrap_err();
        assert_eq!(
            err,
            BoothError::InvalidTransition {
                from: WorkflowState::Selected,
                action: Action::Acquire,
            }
        );
        assert_eq!(booth.state(), WorkflowState::Selected);
    }

    #[test]
    fn reset_clears_image_from_every_resettable_state() {
        let mut booth = selected();
        booth.reset().unwrap();
        assert_eq!(booth.state(), WorkflowState::Ready);
        assert!(booth.image().is_none());

        let mut booth = selected();
        let _ = booth.begin().unwrap();
        booth
            .fail(&ConversionError::MissingVariant {
                expected: 3,
                found: 0,
            })
            .unwrap();
        booth.reset().unwrap();
        assert_eq!(booth.state(), WorkflowState::Ready);
        assert!(booth.image().is_none());
    }

    #[test]
    fn reset_is_not_offered_while_ready_or_in_flight() {
        let mut booth = Booth::new(BoothVariant::Passport);
        assert!(booth.reset().is_err());

        let mut booth = selected();
        let _ = booth.begin().unwrap();
        assert!(booth.reset().is_err());
        assert_eq!(booth.state(), WorkflowState::Detecting);
        assert!(booth.image().is_some());
    }

    #[test]
    fn begin_requires_a_selection() {
        let mut booth = Booth::new(BoothVariant::Passport);
        assert!(booth.begin().is_err());
        assert_eq!(booth.state(), WorkflowState::Ready);
    }

    #[test]
    fn fail_outside_flight_is_rejected() {
        let mut booth = selected();
        let err = ConversionError::MissingVariant {
            expected: 3,
            found: 1,
        };
        assert!(booth.fail(&err).is_err());
        assert_eq!(booth.state(), WorkflowState::Selected);
    }

    #[tokio::test]
    async fn advance_walks_the_forward_path() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let mut booth = selected();
        booth.advance(&service).await.unwrap();

        assert_eq!(booth.state(), WorkflowState::Complete);
        assert_eq!(
            booth.image().unwrap().to_string(),
            "data:image/gif;base64,BBB"
        );
    }

    #[tokio::test]
    async fn stepwise_driving_visits_every_state_in_order() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let mut booth = Booth::new(BoothVariant::Passport);
        let mut seen = vec![booth.state()];

        booth.acquire(photo()).unwrap();
        seen.push(booth.state());

        let pending = booth.begin().unwrap();
        seen.push(booth.state());

        let detected = pending.detect(&service).await.unwrap();
        booth.detected(&detected).unwrap();
        seen.push(booth.state());
        assert_eq!(booth.image().unwrap().payload(), "AAA");

        let converted = detected.convert(&service).await.unwrap();
        booth.converted(&converted).unwrap();
        seen.push(booth.state());

        assert_eq!(seen, WorkflowState::FORWARD);
    }

    #[tokio::test]
    async fn out_of_order_results_are_rejected() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let mut booth = selected();
        let detected = booth.begin().unwrap().detect(&service).await.unwrap();
        let converted = detected.clone().convert(&service).await.unwrap();

        // Converted before detected: skipping `converting` is not allowed.
        assert!(booth.converted(&converted).is_err());
        assert_eq!(booth.state(), WorkflowState::Detecting);

        booth.detected(&detected).unwrap();
        assert!(booth.detected(&detected).is_err());
        assert_eq!(booth.state(), WorkflowState::Converting);
    }

    #[tokio::test]
    async fn failing_detect_is_observable() {
        let service = ScriptedService::failing_detect(ServiceError::Transport(
            "connection refused".into(),
        ));
        let mut booth = selected();
        let err = booth.advance(&service).await.unwrap_err();

        assert!(matches!(err, BoothError::Conversion(ref e) if e.stage() == ConversionStage::Detect));
        assert_eq!(
            booth.state(),
            WorkflowState::Failed {
                stage: ConversionStage::Detect
            }
        );
        // The capture is kept so the failure can be shown over it.
        assert_eq!(booth.image(), Some(&photo()));
    }

    #[tokio::test]
    async fn failing_convert_keeps_cropped_face() {
        let service = ScriptedService::failing_convert(
            "AAA",
            ServiceError::Status {
                status: 502,
                body: "bad gateway".into(),
            },
        );
        let mut booth = selected();
        let err = booth.advance(&service).await.unwrap_err();

        assert!(matches!(err, BoothError::Conversion(ref e) if e.stage() == ConversionStage::Convert));
        assert_eq!(
            booth.state(),
            WorkflowState::Failed {
                stage: ConversionStage::Convert
            }
        );
        assert_eq!(
            booth.image().unwrap().to_string(),
            "data:image/gif;base64,AAA"
        );

        booth.reset().unwrap();
        assert_eq!(booth.state(), WorkflowState::Ready);
        assert!(booth.image().is_none());
    }

    #[tokio::test]
    async fn short_convert_response_fails_the_booth() {
        let service = ScriptedService::new("AAA", &["x"]);
        let mut booth = selected();
        booth.advance(&service).await.unwrap_err();

        assert_eq!(
            booth.state(),
            WorkflowState::Failed {
                stage: ConversionStage::Convert
            }
        );
        assert_eq!(booth.image().unwrap().payload(), "AAA");
    }

    #[tokio::test]
    async fn advance_with_sends_the_snapshot() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let snapshot = DataUrl::parse("data:image/png;base64,U05BUA==").unwrap();
        let mut booth = selected();
        booth.advance_with(snapshot, &service).await.unwrap();

        assert_eq!(service.calls.borrow()[0].1, "U05BUA==");
        assert_eq!(booth.state(), WorkflowState::Complete);
    }

    #[test]
    fn progress_only_while_in_flight() {
        let values: Vec<_> = WorkflowState::FORWARD
            .iter()
            .map(|s| s.progress())
            .collect();
        assert_eq!(values, [None, None, Some(25), Some(65), None]);
    }
}
