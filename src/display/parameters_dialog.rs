// Shader parameters dialog
//
// An egui window with one slider per shader parameter. Changes apply to the
// live chain immediately; the save button asks the presenter to write the
// preset with the current values.

use super::shader::ShaderParameter;
use std::path::PathBuf;

/// Shader parameter editor
#[derive(Debug, Default)]
pub struct ParametersDialog {
    /// Whether the window is shown
    open: bool,

    /// Destination for the save button
    save_path: String,
}

impl ParametersDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog, offering `preset` as the save destination
    pub fn open(&mut self, preset: PathBuf) {
        self.save_path = preset.to_string_lossy().into_owned();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Render the dialog
    ///
    /// Returns the path to save to when the user pressed save.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        parameters: &mut [ShaderParameter],
    ) -> Option<PathBuf> {
        if !self.open {
            return None;
        }

        let mut save = None;
        egui::Window::new("Shader Parameters")
            .open(&mut self.open)
            .default_width(360.0)
            .vscroll(true)
            .show(ctx, |ui| {
                if parameters.is_empty() {
                    ui.label("This shader has no adjustable parameters.");
                }

                egui::Grid::new("shader_parameters_grid")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for parameter in parameters.iter_mut() {
                            ui.label(parameter.name.as_str())
                                .on_hover_text(parameter.id.as_str());
                            let step = f64::from(parameter.step.max(f32::EPSILON));
                            ui.add(
                                egui::Slider::new(&mut parameter.val, parameter.min..=parameter.max)
                                    .step_by(step),
                            );
                            ui.end_row();
                        }
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        parameters.iter_mut().for_each(ShaderParameter::reset);
                    }
                    ui.text_edit_singleline(&mut self.save_path);
                    if ui.button("Save").clicked() && !self.save_path.is_empty() {
                        save = Some(PathBuf::from(&self.save_path));
                    }
                });
            });

        save
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close() {
        let mut dialog = ParametersDialog::new();
        assert!(!dialog.is_open());
        dialog.open(PathBuf::from("/shaders/crt.preset"));
        assert!(dialog.is_open());
        dialog.close();
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_hidden_dialog_does_nothing() {
        let ctx = egui::Context::default();
        let mut dialog = ParametersDialog::new();
        let mut saved = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            saved = dialog.show(ctx, &mut []);
        });
        assert_eq!(saved, None);
    }
}
