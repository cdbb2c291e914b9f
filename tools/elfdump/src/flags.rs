use std::path::PathBuf;

xflags::xflags! {
    /// Decode an ELF file and print its structure.
    cmd elfdump {
        /// The file to decode.
        required path: PathBuf
        /// Print the image even if section names can't be resolved.
        optional --lenient
        /// Only print the identification block and the header.
        optional --headers-only
        /// Log what the decoder is doing. Repeat for more detail.
        repeated -v, --verbose
    }
}
