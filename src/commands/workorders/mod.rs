pub mod create_work_order_command;
pub mod escalate_call_log_command;
pub mod update_work_order_command;

pub use create_work_order_command::CreateWorkOrderCommand;
pub use escalate_call_log_command::{EscalateCallLogCommand, Escalation};
pub use update_work_order_command::UpdateWorkOrderCommand;
