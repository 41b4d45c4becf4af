/*!

A "logger" that does not output anything anywhere but satisfies the public API. Used when the
`logging` feature is off.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
