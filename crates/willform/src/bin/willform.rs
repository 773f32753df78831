fn main() -> anyhow::Result<()> {
    willform::cli::main()
}
