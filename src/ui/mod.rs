pub mod highlight;
pub mod output;
pub mod parser;

pub use highlight::CodeHighlighter;
pub use output::{
    display_config, display_help, display_message, display_notice, display_notices,
    display_usage, display_welcome, format_usage, render_reply,
};
pub use parser::{parse_content, ContentPart};
