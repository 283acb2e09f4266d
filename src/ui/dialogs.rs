// Native follow-up dialogs shown between attempts

use crate::controller::AttemptReport;

/// Whether a finished attempt should lead to the "pick another" question.
///
/// Closing the picker ends the session; every other outcome offers a new pick.
pub fn offers_another_pick(report: &AttemptReport) -> bool {
    !matches!(report, AttemptReport::Cancelled)
}

/// Ask whether to pick another file.
pub async fn ask_pick_another() -> bool {
    let answer = rfd::AsyncMessageDialog::new()
        .set_level(rfd::MessageLevel::Info)
        .set_title("FileMitra")
        .set_description("Pick another file?")
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        .await;

    matches!(
        answer,
        rfd::MessageDialogResult::Yes | rfd::MessageDialogResult::Ok
    )
}
