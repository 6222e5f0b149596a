//! Console command formatting and the console messages scripted actions wait for.

/// Prefix that routes a Hercules command to the MVS operator console.
pub const OPERATOR_PREFIX: &str = "/";

/// Operator command: `/` followed by `command`.
pub fn operator(command: &str) -> String {
    format!("{OPERATOR_PREFIX}{command}")
}

/// Reply to the outstanding message `reply`: `/r <reply>,<text>`.
pub fn reply(reply: &str, text: &str) -> String {
    format!("/r {reply},{text}")
}

/// Hercules commands that move the 3525 punch to `path`.
pub fn punch_output(path: &str) -> [String; 2] {
    ["detach d".to_string(), format!("attach d 3525 {path} ebcdic")]
}

/// Console messages and commands of the MVS boot and shutdown scripts.
pub mod mvs {
    /// IPL from the system residence volume.
    pub const IPL: &str = "ipl 150";
    /// Console prompt after IPL when no rc file answers it.
    pub const CONSOLE_PROMPT: &str = "input for console 0:0009";
    /// Operator reply requesting a CLPA rebuild.
    pub const CLPA_REPLY: &str = "r 0,clpa";

    /// Abend JES2.
    pub const JES2_ABEND: &str = "$PJES2,ABEND";
    /// JES2 asks how to terminate.
    pub const JES2_TERMINATION_PROMPT: &str = "00 $HASP098 ENTER TERMINATION OPTION";
    /// Purge JES2.
    pub const JES2_PURGE: &str = "r 00,PURGE";
    /// JES2 ended (customised systems).
    pub const JES2_ENDED: &str = "IEF404I JES2 - ENDED - ";
    /// Spool volume released.
    pub const SPOOL_RELEASED: &str = "IEF196I IEF285I   VOL SER NOS= SPOOL0.";
    /// End of day.
    pub const END_OF_DAY: &str = "z eod";
    /// End of day done.
    pub const END_OF_DAY_DONE: &str = "IEE334I HALT     EOD SUCCESSFUL";
    /// Quiesce the system.
    pub const QUIESCE: &str = "quiesce";
    /// Processor stopped after quiesce.
    pub const DISABLED_WAIT: &str = "disabled wait state";
    /// Stop all processors.
    pub const STOP: &str = "stop";

    /// TK4- automated shutdown.
    pub const TK4_SHUTDOWN: &str = "f bsppilot,shutnow";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_command() {
        assert_eq!(operator("d a,l"), "/d a,l");
        assert_eq!(operator(mvs::JES2_ABEND), "/$PJES2,ABEND");
    }

    #[test]
    fn test_reply_embeds_token_verbatim() {
        assert_eq!(reply("07", "CANCEL"), "/r 07,CANCEL");
        assert_eq!(reply("0", "clpa"), "/r 0,clpa");
    }

    #[test]
    fn test_punch_output() {
        assert_eq!(
            punch_output("punch/out.ebcdic"),
            ["detach d".to_string(), "attach d 3525 punch/out.ebcdic ebcdic".to_string()]
        );
    }
}
