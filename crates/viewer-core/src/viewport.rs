use crate::transform::ScaleTransform;

/// Allowed zoom range and the increment used by zoom in/out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0, step: 0.1 }
    }
}

impl ScaleBounds {
    /// Inverted bounds are treated as swapped. Non-finite scales land on the
    /// lower bound.
    pub fn clamp(&self, scale: f32) -> f32 {
        let (low, high) = self.ordered();
        if !scale.is_finite() {
            return low;
        }
        scale.max(low).min(high)
    }

    fn ordered(&self) -> (f32, f32) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

/// Intrinsic dimensions reported by a renderer once content is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentMetrics {
    pub natural_width: f32,
    pub natural_height: f32,
    /// `None` while the page count is unknown.
    pub total_pages: Option<u32>,
}

/// Current page, zoom and content dimensions of the open document.
///
/// Nothing here touches element coordinates: page and scale only feed the
/// display-time transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    page: u32,
    scale: f32,
    bounds: ScaleBounds,
    metrics: Option<ContentMetrics>,
    page_count: Option<u32>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(ScaleBounds::default())
    }
}

impl ViewportState {
    pub fn new(bounds: ScaleBounds) -> Self {
        Self { page: 1, scale: 1.0, bounds, metrics: None, page_count: None }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    pub fn metrics(&self) -> Option<ContentMetrics> {
        self.metrics
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.page_count
    }

    pub fn transform(&self) -> ScaleTransform {
        ScaleTransform::new(self.scale)
    }

    /// Label value for the zoom indicator.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round().max(0.0) as u32
    }

    /// Record renderer-reported dimensions. May arrive at any time, including
    /// after the element list has been loaded.
    pub fn apply_metrics(&mut self, metrics: ContentMetrics) {
        self.metrics = Some(metrics);
        if let Some(total) = metrics.total_pages {
            self.apply_page_count(total);
        }
        tracing::debug!(
            natural_width = metrics.natural_width,
            total_pages = ?metrics.total_pages,
            "content metrics reported"
        );
    }

    /// Record a page count learned without full metrics, for example from a
    /// renderer rejecting an out-of-range page. Pulls the current page back
    /// into range.
    pub fn apply_page_count(&mut self, total: u32) {
        let total = total.max(1);
        self.page_count = Some(total);
        self.page = self.page.min(total);
    }

    /// Clears content metrics and resets page and zoom for a newly opened document.
    pub fn reset(&mut self) {
        self.page = 1;
        self.scale = 1.0;
        self.metrics = None;
        self.page_count = None;
    }

    /// Clamps to `[1, total_pages]` when the page count is known; otherwise
    /// any positive page is accepted.
    pub fn set_page(&mut self, page: u32) -> u32 {
        let page = page.max(1);
        self.page = match self.total_pages() {
            Some(total) => page.min(total.max(1)),
            None => page,
        };
        self.page
    }

    pub fn can_go_previous(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.total_pages().is_some_and(|total| self.page < total)
    }

    pub fn next_page(&mut self) -> u32 {
        if self.can_go_next() {
            self.page += 1;
        }
        self.page
    }

    pub fn previous_page(&mut self) -> u32 {
        self.page = self.page.saturating_sub(1).max(1);
        self.page
    }

    pub fn set_scale(&mut self, scale: f32) -> f32 {
        self.scale = self.bounds.clamp(scale);
        self.scale
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.step_scale(self.bounds.step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.step_scale(-self.bounds.step)
    }

    fn step_scale(&mut self, delta: f32) -> f32 {
        // Hundredths keep repeated steps from drifting (1.0 + 0.1 * 3 != 1.3).
        let stepped = ((self.scale + delta) * 100.0).round() / 100.0;
        self.set_scale(stepped)
    }

    /// Scale that makes the content's natural width fill `available_width`.
    ///
    /// Deliberately not clamped to [`ScaleBounds`]: fit-to-width may go past
    /// the normal zoom range. Returns `None` and leaves the scale alone while
    /// the natural width is unknown.
    pub fn fit_to_width(&mut self, available_width: f32) -> Option<f32> {
        let natural_width = self.metrics?.natural_width;
        let usable = |width: f32| width.is_finite() && width > 0.0;
        if !usable(natural_width) || !usable(available_width) {
            return None;
        }

        let scale = available_width / natural_width;
        if !usable(scale) {
            tracing::warn!(natural_width, available_width, "fit to width produced no usable scale");
            return None;
        }

        self.scale = scale;
        tracing::debug!(scale, "fit to width");
        Some(scale)
    }
}

/// Width left for content once fixed padding is removed from the container.
pub fn available_width(container_width: f32, padding: f32) -> f32 {
    (container_width - padding).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paginated(total_pages: u32) -> ViewportState {
        let mut state = ViewportState::default();
        state.apply_metrics(ContentMetrics {
            natural_width: 400.0,
            natural_height: 600.0,
            total_pages: Some(total_pages),
        });
        state
    }

    #[test]
    fn set_page_clamps_when_total_known() {
        let mut state = paginated(3);
        assert_eq!(state.set_page(100), 3);
        assert_eq!(state.set_page(0), 1);
    }

    #[test]
    fn set_page_accepts_any_positive_page_before_metrics() {
        let mut state = ViewportState::default();
        assert_eq!(state.set_page(42), 42);
        assert_eq!(state.set_page(0), 1);
    }

    #[test]
    fn late_metrics_pull_page_back_into_range() {
        let mut state = ViewportState::default();
        state.set_page(9);
        state.apply_metrics(ContentMetrics {
            natural_width: 612.0,
            natural_height: 792.0,
            total_pages: Some(4),
        });
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn next_and_previous_stay_in_document() {
        let mut state = paginated(2);
        assert!(!state.can_go_previous());
        assert_eq!(state.next_page(), 2);
        assert_eq!(state.next_page(), 2);
        assert!(!state.can_go_next());
        assert_eq!(state.previous_page(), 1);
        assert_eq!(state.previous_page(), 1);
    }

    #[test]
    fn zoom_steps_land_on_round_values() {
        let mut state = ViewportState::default();
        state.zoom_in();
        state.zoom_in();
        state.zoom_in();
        assert_eq!(state.scale(), 1.3);
        assert_eq!(state.zoom_percent(), 130);
    }

    #[test]
    fn set_scale_clamps_to_bounds() {
        let mut state = ViewportState::default();
        assert_eq!(state.set_scale(5.0), 2.0);
        assert_eq!(state.set_scale(0.1), 0.5);
        assert_eq!(state.set_scale(f32::NAN), 0.5);
    }

    #[test]
    fn fit_to_width_fills_container() {
        let mut state = paginated(1);
        assert_eq!(state.fit_to_width(800.0), Some(2.0));
        assert_eq!(state.scale(), 2.0);
    }

    #[test]
    fn fit_to_width_is_not_clamped() {
        let mut state = paginated(1);
        assert_eq!(state.fit_to_width(1200.0), Some(3.0));

        // Stepped zoom pulls the scale back into range.
        assert_eq!(state.zoom_out(), 2.0);
    }

    #[test]
    fn fit_to_width_waits_for_metrics() {
        let mut state = ViewportState::default();
        assert_eq!(state.fit_to_width(800.0), None);
        assert_eq!(state.scale(), 1.0);
    }

    #[test]
    fn fit_to_width_rejects_degenerate_widths() {
        for natural_width in [f32::NAN, f32::INFINITY, 0.0, -10.0, 1e-39] {
            let mut state = ViewportState::default();
            state.apply_metrics(ContentMetrics {
                natural_width,
                natural_height: 600.0,
                total_pages: None,
            });
            assert_eq!(state.fit_to_width(800.0), None, "natural width {natural_width}");
            assert_eq!(state.scale(), 1.0);
            assert_eq!(state.transform().scale(), state.scale());
        }

        let mut state = paginated(1);
        assert_eq!(state.fit_to_width(f32::INFINITY), None);
        assert_eq!(state.fit_to_width(f32::NAN), None);
        assert_eq!(state.scale(), 1.0);
    }

    #[test]
    fn metrics_are_kept_until_reset() {
        let mut state = paginated(3);
        state.set_page(3);
        state.set_scale(1.5);
        assert_eq!(state.metrics().map(|metrics| metrics.natural_width), Some(400.0));

        state.reset();
        assert_eq!(state.metrics(), None);
        assert_eq!(state.total_pages(), None);
        assert_eq!((state.page(), state.scale()), (1, 1.0));
    }

    #[test]
    fn next_page_without_known_total_stays_put() {
        let mut state = ViewportState::default();
        assert!(!state.can_go_next());
        assert_eq!(state.next_page(), 1);

        state.set_page(5);
        assert_eq!(state.next_page(), 5);
        assert_eq!(state.previous_page(), 4);
    }

    #[test]
    fn page_count_alone_clamps_the_page() {
        let mut state = ViewportState::default();
        state.set_page(7);
        state.apply_page_count(2);
        assert_eq!(state.page(), 2);
        assert_eq!(state.total_pages(), Some(2));
        assert_eq!(state.metrics(), None);

        // A later report without a count keeps what is already known.
        state.apply_metrics(ContentMetrics {
            natural_width: 612.0,
            natural_height: 792.0,
            total_pages: None,
        });
        assert_eq!(state.total_pages(), Some(2));
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let bounds = ScaleBounds { min: 2.0, max: 0.5, step: 0.1 };
        let mut state = ViewportState::new(bounds);
        assert_eq!(state.bounds(), bounds);
        assert_eq!(state.set_scale(1.0), 1.0);
        assert_eq!(state.set_scale(3.0), 2.0);
        assert_eq!(state.set_scale(0.1), 0.5);
        assert_eq!(state.set_scale(f32::NAN), 0.5);
    }

    #[test]
    fn padding_is_subtracted_from_container() {
        assert_eq!(available_width(864.0, 64.0), 800.0);
        assert_eq!(available_width(10.0, 64.0), 0.0);
    }

    proptest! {
        #[test]
        fn stepped_zoom_never_leaves_bounds(steps in prop::collection::vec(any::<bool>(), 0..60)) {
            let mut state = ViewportState::default();
            for zoom_in in steps {
                let scale = if zoom_in { state.zoom_in() } else { state.zoom_out() };
                prop_assert!((0.5..=2.0).contains(&scale));
            }
        }

        #[test]
        fn set_scale_never_leaves_bounds(scale in -10.0f32..10.0) {
            let mut state = ViewportState::default();
            let applied = state.set_scale(scale);
            prop_assert!((0.5..=2.0).contains(&applied));
        }
    }
}
