//! Macros for ergonomic machine construction.

/// Write a transition table as `from => exit => to` rows.
///
/// Rows keep their order, so the first row for a `(from, exit)` pair is the
/// one the machine uses.
///
/// # Example
///
/// ```
/// use coop_fsm::core::ExitCode;
/// use coop_fsm::transition_table;
///
/// const BUTTON: ExitCode = ExitCode::USER;
///
/// let table = transition_table! {
///     "OFF" => BUTTON => "ON",
///     "ON" => BUTTON => "BLINK",
///     "ON" => ExitCode::TIMEOUT => "OFF",
/// };
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table[2].exit, ExitCode::TIMEOUT);
/// ```
#[macro_export]
macro_rules! transition_table {
    ( $( $from:expr => $exit:expr => $to:expr ),* $(,)? ) => {
        vec![
            $( $crate::builder::TransitionSpec::new($from, $exit, $to) ),*
        ]
    };
}
