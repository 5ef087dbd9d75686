//! One-way UI mirrors of simulation state.

/// Presentation layer fed after each relevant mutation.
pub trait UiProjection {
    fn update_stamina(&mut self, percent: f32);
    fn update_battery(&mut self, percent: f32);
    fn update_sanity(&mut self, percent: f32);
    fn show_interaction_prompt(&mut self, text: Option<&str>);
    fn hide_interaction_prompt(&mut self);
    fn update_objective(&mut self, text: &str);
}

/// Headless projection used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessUi;

impl UiProjection for HeadlessUi {
    fn update_stamina(&mut self, _percent: f32) {}
    fn update_battery(&mut self, _percent: f32) {}
    fn update_sanity(&mut self, _percent: f32) {}
    fn show_interaction_prompt(&mut self, _text: Option<&str>) {}
    fn hide_interaction_prompt(&mut self) {}
    fn update_objective(&mut self, _text: &str) {}
}
