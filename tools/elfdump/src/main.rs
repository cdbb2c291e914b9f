mod flags;
mod logger;

use colored::Colorize;
use elfview::{DecodeOptions, ElfImage, ProgramHeader, Section, SegmentFlags, SectionFlags};
use eyre::{Result, WrapErr};

fn main() -> Result<()> {
    color_eyre::install()?;
    let flags = flags::Elfdump::from_env_or_exit();
    logger::init(flags.verbose)?;

    let bytes = std::fs::read(&flags.path).wrap_err_with(|| format!("Failed to read {}", flags.path.display()))?;
    let options = DecodeOptions::new().strict_names(!flags.lenient);
    let image = ElfImage::parse_with(&bytes, options)
        .wrap_err_with(|| format!("Failed to decode {} as ELF", flags.path.display()))?;

    print_header(&image);
    if !flags.headers_only {
        print_segments(&image);
        print_sections(&image);
    }

    if let Some(err) = image.name_error() {
        println!("{}", format!("[!] Section names unavailable: {}", err).bold().yellow());
    }
    for warning in image.warnings() {
        println!("{}", format!("[!] {}", warning).bold().yellow());
    }

    Ok(())
}

fn print_header(image: &ElfImage) {
    let ident = image.identification();
    let header = image.header();

    println!("{}", "[*] ELF header".bold().magenta());
    println!("  Class:             {}", ident.class);
    println!("  Data:              {}", ident.endianness);
    println!("  Version:           {}", ident.version);
    println!("  OS/ABI:            {:?} (ABI version {})", ident.os_abi, ident.abi_version);
    println!("  Type:              {:?}", header.object_type);
    println!("  Machine:           {:?}", header.machine);
    println!("  Entry point:       {:#x}", header.entry_point);
    println!("  Flags:             {:#x}", header.flags);
    println!(
        "  Program headers:   {} x {:#x} bytes at {:#x}",
        header.number_of_program_headers, header.program_header_entry_size, header.program_header_offset
    );
    println!(
        "  Section headers:   {} x {:#x} bytes at {:#x}",
        header.number_of_section_headers, header.section_header_entry_size, header.section_header_offset
    );
    println!("  Names in section:  {}", header.string_table_index);
    if let Some(interpreter) = image.interpreter() {
        println!("  Interpreter:       {}", interpreter);
    }
}

fn print_segments(image: &ElfImage) {
    println!("{}", "[*] Program headers".bold().magenta());
    println!(
        "  {:<16} {:>10} {:>18} {:>10} {:>10} {:<3} {:>8}",
        "Type", "Offset", "VirtAddr", "FileSize", "MemSize", "Flg", "Align"
    );
    for segment in image.segments() {
        println!(
            "  {:<16} {:>#10x} {:>#18x} {:>#10x} {:>#10x} {:<3} {:>#8x}",
            format!("{:?}", segment.segment_type),
            segment.offset,
            segment.virtual_address,
            segment.file_size,
            segment.mem_size,
            segment_flags(segment),
            segment.alignment
        );
    }
}

fn segment_flags(segment: &ProgramHeader) -> String {
    [(SegmentFlags::READABLE, 'R'), (SegmentFlags::WRITABLE, 'W'), (SegmentFlags::EXECUTABLE, 'E')]
        .iter()
        .map(|&(flag, c)| if segment.flags.contains(flag) { c } else { ' ' })
        .collect()
}

fn print_sections(image: &ElfImage) {
    println!("{}", "[*] Section headers".bold().magenta());
    println!(
        "  {:>3} {:<20} {:<14} {:>18} {:>10} {:>10} {:<4}",
        "Nr", "Name", "Type", "Address", "Offset", "Size", "Flg"
    );
    for (index, section) in image.sections().iter().enumerate() {
        println!(
            "  {:>3} {:<20} {:<14} {:>#18x} {:>#10x} {:>#10x} {:<4}",
            index,
            section.name.unwrap_or("<unknown>"),
            format!("{:?}", section.header.section_type),
            section.header.address,
            section.header.offset,
            section.header.size,
            section_flags(section)
        );
    }
}

fn section_flags(section: &Section) -> String {
    [
        (SectionFlags::WRITE, 'W'),
        (SectionFlags::ALLOC, 'A'),
        (SectionFlags::EXECINSTR, 'X'),
        (SectionFlags::MERGE, 'M'),
        (SectionFlags::STRINGS, 'S'),
        (SectionFlags::TLS, 'T'),
    ]
    .iter()
    .filter(|(flag, _)| section.header.flags.contains(*flag))
    .map(|&(_, c)| c)
    .collect()
}
