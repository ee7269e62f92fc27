//! Memory map command implementations

use super::format_size;
use srecflash_core::MemoryMap;
use std::path::Path;

/// Show the windows of a memory map
pub fn cmd_show(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let map = MemoryMap::from_toml_file(file)?;
    print_map(&map);
    Ok(())
}

/// Print a memory map
pub fn print_map(map: &MemoryMap) {
    if let Some(name) = &map.name {
        println!("Memory map: {}", name);
        println!();
    }

    if map.is_empty() {
        println!("No windows defined");
        return;
    }

    println!(
        "{:<16} {:>10} {:>10} {:>12} {:>5}",
        "Name", "Start", "End", "Size", "Fill"
    );
    println!("{}", "-".repeat(57));
    for window in &map.windows {
        println!(
            "{:<16} 0x{:08X} 0x{:08X} {:>12} 0x{:02X}",
            window.name,
            window.start,
            window.end,
            format_size(window.size() as u64),
            window.fill
        );
    }
}
