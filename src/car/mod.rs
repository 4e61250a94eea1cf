pub mod fsm;
pub mod ui_panel;


pub use fsm::CarCore;
pub use fsm::CarFsm;
pub use fsm::HallCallOutcome;
pub use ui_panel::UiPanel;
