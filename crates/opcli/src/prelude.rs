pub use crate::error::Error;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Context, OptionExt, Result};
pub use std::format as f;

pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();

    let format = prettytable::format::FormatBuilder::new()
        .padding(1, 1)
        .build();

    table.set_format(format);

    table
}

/// Print `data` as pretty JSON with sorted keys when `--debug-json` is set.
pub fn print_debug_json<T: serde::Serialize>(data: &T, enabled: bool) -> Result<()> {
    if enabled {
        // Going through `Value` sorts object keys.
        let value = serde_json::to_value(data)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
