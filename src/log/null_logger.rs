/*!

Used when the `logging` feature is off: nothing is installed, but the public API still works and
`log::max_level()` follows the configured global level.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
