//! Builds ELF images byte by byte, so the decoder can be checked against a layout worked out by hand.

#![allow(dead_code)]

use elfview::{Class, Endianness};

pub struct Segment {
    pub segment_type: u32,
    pub flags: u32,
    pub data: Vec<u8>,
    pub virtual_address: u64,
    pub mem_size: u64,
    pub alignment: u64,
}

pub struct Section {
    pub name: &'static str,
    pub section_type: u32,
    pub flags: u64,
    pub address: u64,
    pub data: Vec<u8>,

    /// Only used for `NOBITS` sections, which take up no space in the file.
    pub size: u64,
    pub alignment: u64,
}

impl Section {
    pub fn new(name: &'static str, section_type: u32, data: &[u8]) -> Section {
        Section {
            name,
            section_type,
            flags: 0,
            address: 0,
            data: data.to_vec(),
            size: data.len() as u64,
            alignment: 1,
        }
    }
}

/// Where everything ended up in a built image.
#[derive(Clone, Copy, Debug, Default)]
pub struct Layout {
    pub program_header_offset: u64,
    pub section_header_offset: u64,
    pub string_table_offset: u64,
    pub string_table_index: u16,
}

pub struct Fixture {
    pub class: Class,
    pub endianness: Endianness,
    pub object_type: u16,
    pub machine: u16,
    pub entry_point: u64,
    pub flags: u32,
    pub os_abi: u8,
    pub segments: Vec<Segment>,
    pub sections: Vec<Section>,

    /// Whether to emit a section name string table (always placed last) for the sections.
    pub with_string_table: bool,
}

impl Fixture {
    pub fn new(class: Class, endianness: Endianness) -> Fixture {
        Fixture {
            class,
            endianness,
            object_type: 2,
            machine: 0x3e,
            entry_point: 0x401000,
            flags: 0,
            os_abi: 0,
            segments: Vec::new(),
            sections: Vec::new(),
            with_string_table: true,
        }
    }

    /// An executable with a loadable text segment, a note segment, and `.text`, `.data`, `.bss` and
    /// `.note.test` sections.
    pub fn executable(class: Class, endianness: Endianness) -> Fixture {
        let mut fixture = Fixture::new(class, endianness);
        let text = vec![0x90, 0x90, 0x90, 0xc3, 0xcc, 0xcc, 0xcc, 0xcc];
        let note = note(endianness, b"TEST", 7, &[1, 2, 3, 4]);

        fixture.segments.push(Segment {
            segment_type: 1,
            flags: 0x5,
            data: text.clone(),
            virtual_address: 0x401000,
            mem_size: 0x1000,
            alignment: 0x1000,
        });
        fixture.segments.push(Segment {
            segment_type: 4,
            flags: 0x4,
            data: note.clone(),
            virtual_address: 0x402000,
            mem_size: note.len() as u64,
            alignment: 4,
        });

        fixture.sections.push(Section { flags: 0x6, address: 0x401000, ..Section::new(".text", 1, &text) });
        fixture.sections.push(Section {
            flags: 0x3,
            address: 0x403000,
            ..Section::new(".data", 1, &[0xde, 0xad])
        });
        fixture.sections.push(Section {
            flags: 0x3,
            address: 0x404000,
            size: 0x200,
            ..Section::new(".bss", 8, &[])
        });
        fixture.sections.push(Section { alignment: 4, ..Section::new(".note.test", 7, &note) });
        fixture
    }

    pub fn header_size(&self) -> usize {
        match self.class {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    pub fn program_header_size(&self) -> usize {
        match self.class {
            Class::Elf32 => 0x20,
            Class::Elf64 => 0x38,
        }
    }

    pub fn section_header_size(&self) -> usize {
        match self.class {
            Class::Elf32 => 0x28,
            Class::Elf64 => 0x40,
        }
    }

    pub fn build(&self) -> (Vec<u8>, Layout) {
        let mut layout = Layout::default();

        /*
         * Work out the section name string table first, since it's stored with the other section data.
         */
        let mut string_table = vec![0u8];
        let mut name_offsets = Vec::new();
        for section in &self.sections {
            name_offsets.push(string_table.len() as u32);
            string_table.extend_from_slice(section.name.as_bytes());
            string_table.push(0);
        }
        let string_table_name_offset = string_table.len() as u32;
        string_table.extend_from_slice(b".shstrtab\0");

        /*
         * Lay out the file: header, program headers, segment data, section data, string table, section headers.
         */
        let mut cursor = self.header_size();
        if !self.segments.is_empty() {
            layout.program_header_offset = cursor as u64;
            cursor += self.program_header_size() * self.segments.len();
        }

        let mut segment_offsets = Vec::new();
        for segment in &self.segments {
            segment_offsets.push(cursor as u64);
            cursor += segment.data.len();
        }

        let mut section_offsets = Vec::new();
        for section in &self.sections {
            section_offsets.push(cursor as u64);
            cursor += section.data.len();
        }

        if self.with_string_table {
            layout.string_table_offset = cursor as u64;
            layout.string_table_index = self.sections.len() as u16 + 1;
            cursor += string_table.len();
        }

        let number_of_sections = if self.sections.is_empty() && !self.with_string_table {
            0
        } else {
            self.sections.len() + 1 + if self.with_string_table { 1 } else { 0 }
        };
        if number_of_sections > 0 {
            cursor = (cursor + 7) & !7;
            layout.section_header_offset = cursor as u64;
        }

        /*
         * Now write everything out.
         */
        let mut w = Writer { bytes: Vec::new(), class: self.class, endianness: self.endianness };
        w.raw(&[0x7f, b'E', b'L', b'F']);
        w.u8(match self.class {
            Class::Elf32 => 1,
            Class::Elf64 => 2,
        });
        w.u8(match self.endianness {
            Endianness::Little => 1,
            Endianness::Big => 2,
        });
        w.u8(1);
        w.u8(self.os_abi);
        w.u8(0);
        w.raw(&[0; 7]);

        w.u16(self.object_type);
        w.u16(self.machine);
        w.u32(1);
        w.word(self.entry_point);
        w.word(layout.program_header_offset);
        w.word(layout.section_header_offset);
        w.u32(self.flags);
        w.u16(self.header_size() as u16);
        w.u16(if self.segments.is_empty() { 0 } else { self.program_header_size() as u16 });
        w.u16(self.segments.len() as u16);
        w.u16(if number_of_sections == 0 { 0 } else { self.section_header_size() as u16 });
        w.u16(number_of_sections as u16);
        w.u16(layout.string_table_index);
        assert_eq!(w.bytes.len(), self.header_size());

        for (segment, &offset) in self.segments.iter().zip(&segment_offsets) {
            w.u32(segment.segment_type);
            if self.class == Class::Elf64 {
                w.u32(segment.flags);
            }
            w.word(offset);
            w.word(segment.virtual_address);
            w.word(segment.virtual_address);
            w.word(segment.data.len() as u64);
            w.word(segment.mem_size);
            if self.class == Class::Elf32 {
                w.u32(segment.flags);
            }
            w.word(segment.alignment);
        }

        for segment in &self.segments {
            w.raw(&segment.data);
        }
        for section in &self.sections {
            w.raw(&section.data);
        }
        if self.with_string_table {
            w.raw(&string_table);
        }

        if number_of_sections > 0 {
            w.bytes.resize(layout.section_header_offset as usize, 0);

            // The null section
            w.raw(&vec![0; self.section_header_size()]);

            for ((section, &offset), &name) in self.sections.iter().zip(&section_offsets).zip(&name_offsets) {
                w.section_header(
                    name,
                    section.section_type,
                    section.flags,
                    section.address,
                    offset,
                    section.size,
                    section.alignment,
                );
            }

            if self.with_string_table {
                w.section_header(
                    string_table_name_offset,
                    3,
                    0,
                    0,
                    layout.string_table_offset,
                    string_table.len() as u64,
                    1,
                );
            }
        }

        (w.bytes, layout)
    }
}

/// Encode a single note record.
pub fn note(endianness: Endianness, name: &[u8], entry_type: u32, desc: &[u8]) -> Vec<u8> {
    let mut w = Writer { bytes: Vec::new(), class: Class::Elf32, endianness };
    w.u32(name.len() as u32 + 1);
    w.u32(desc.len() as u32);
    w.u32(entry_type);
    w.raw(name);
    w.u8(0);
    while w.bytes.len() % 4 != 0 {
        w.u8(0);
    }
    w.raw(desc);
    while w.bytes.len() % 4 != 0 {
        w.u8(0);
    }
    w.bytes
}

/// Write `value` into `bytes[offset..offset + width]`, one byte at a time.
pub fn put(bytes: &mut [u8], offset: usize, width: usize, value: u64, endianness: Endianness) {
    for i in 0..width {
        let shift = match endianness {
            Endianness::Little => 8 * i,
            Endianness::Big => 8 * (width - 1 - i),
        };
        bytes[offset + i] = (value >> shift) as u8;
    }
}

struct Writer {
    bytes: Vec<u8>,
    class: Class,
    endianness: Endianness,
}

impl Writer {
    fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn uint(&mut self, width: usize, value: u64) {
        let offset = self.bytes.len();
        self.bytes.resize(offset + width, 0);
        put(&mut self.bytes, offset, width, value, self.endianness);
    }

    fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.uint(2, value as u64);
    }

    fn u32(&mut self, value: u32) {
        self.uint(4, value as u64);
    }

    fn word(&mut self, value: u64) {
        match self.class {
            Class::Elf32 => self.uint(4, value),
            Class::Elf64 => self.uint(8, value),
        }
    }

    fn section_header(
        &mut self,
        name: u32,
        section_type: u32,
        flags: u64,
        address: u64,
        offset: u64,
        size: u64,
        alignment: u64,
    ) {
        self.u32(name);
        self.u32(section_type);
        self.word(flags);
        self.word(address);
        self.word(offset);
        self.word(size);
        self.u32(0);
        self.u32(0);
        self.word(alignment);
        self.word(0);
    }
}
