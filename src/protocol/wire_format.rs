//! Wire format constants.
//!
//! Request layout:
//! ```text
//! <command id="7" type="vol_list" close_on_return="no" [remote_target="..."]>
//!     <option name="user" value="admin"/>
//!     <argument name="pool" value="p1"/>
//! </command>
//! ```
//!
//! Response layout (outcome node at either nesting depth):
//! ```text
//! <command>
//!     <aserver status="DELIVERY_SUCCESSFUL"/>
//!     <administrator>
//!         <command>
//!             <code value="SUCCESS"/>
//!             <status value="0"/>
//!             <status_str value="Command completed successfully"/>
//!             <return> ... </return>
//!         </command>
//!     </administrator>
//! </command>
//! ```

/// Default plaintext port.
pub const DEFAULT_PORT: u16 = 7777;

/// Default TLS port.
pub const DEFAULT_SSL_PORT: u16 = 7778;

/// Maximum bytes moved per socket call.
pub const MAX_IO_CHUNK: usize = 16000;

// Request

pub const COMMAND_TAG: &str = "command";
pub const OPTION_TAG: &str = "option";
pub const ARGUMENT_TAG: &str = "argument";
pub const ID_ATTR: &str = "id";
pub const TYPE_ATTR: &str = "type";
pub const CLOSE_ON_RETURN_ATTR: &str = "close_on_return";
pub const REMOTE_TARGET_ATTR: &str = "remote_target";
pub const NAME_ATTR: &str = "name";
pub const VALUE_ATTR: &str = "value";

pub const YES: &str = "yes";
pub const NO: &str = "no";

// Response

/// Delivery status location (`aserver/@status`).
pub const DELIVERY_STATUS_PATH: &str = "aserver";
pub const DELIVERY_STATUS_ATTR: &str = "status";
pub const DELIVERY_SUCCESSFUL: &str = "DELIVERY_SUCCESSFUL";

/// Outcome node locations, shallowest first.
pub const OUTCOME_PATHS: [&str; 2] = ["administrator/command", "command/administrator/command"];

pub const CODE_PATH: &str = "code";
pub const LEVEL_PATH: &str = "status";
pub const STATUS_STR_PATH: &str = "status_str";
pub const SUCCESS: &str = "SUCCESS";

pub const RETURN_PATH: &str = "return";
pub const COMPRESSED_RETURN_PATH: &str = "compressed_return";

// Options

pub const USER_OPTION: &str = "user";
pub const PASSWORD_OPTION: &str = "password";
pub const COMPRESS_OUTPUT_OPTION: &str = "compress-output";
pub const PASSWORD_MASK: &str = "XXX";

/// Options every session starts with.
pub const DEFAULT_OPTIONS: [(&str, &str); 5] = [
    ("i-am-sure", YES),
    ("gui-mode", YES),
    ("force-output", YES),
    ("print-header", NO),
    (COMPRESS_OUTPUT_OPTION, "base64"),
];

// Reserved commands

/// Self-describing command catalog.
pub const HELP_COMMAND: &str = "help";

/// Lists the array's IP interfaces; used for endpoint discovery.
pub const DISCOVERY_COMMAND: &str = "ipinterface_list";

/// Interface role eligible for discovery.
pub const MANAGEMENT_ROLE: &str = "management";
