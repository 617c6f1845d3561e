pub mod capture_document;
pub mod complete;
pub mod confirm_quit;
pub mod select_country;
pub mod select_document;

// Re-exports so you can keep using crate::screens::XYZScreen
pub use capture_document::CaptureDocumentScreen;
pub use complete::CompleteScreen;
pub use confirm_quit::ConfirmQuitScreen;
pub use select_country::SelectCountryScreen;
pub use select_document::SelectDocumentScreen;

use crate::app::{AppCtx, ScreenWidget};
use crate::wizard::WizardStep;

/// Screen that implements a wizard step.
pub fn screen_for(step: WizardStep, ctx: &AppCtx) -> Box<dyn ScreenWidget> {
    match step {
        WizardStep::SelectCountry => Box::new(SelectCountryScreen::new(&ctx.catalog)),
        WizardStep::SelectDocument => Box::new(SelectDocumentScreen::new(ctx)),
        WizardStep::Capture(i) => match ctx.wizard.side(i) {
            Some(side) => Box::new(CaptureDocumentScreen::new(i, side)),
            None => Box::new(SelectDocumentScreen::new(ctx)),
        },
        WizardStep::Complete => Box::new(CompleteScreen::new()),
    }
}
