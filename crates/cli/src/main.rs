fn main() -> Result<(), Box<dyn std::error::Error>> {
    groovyscope_cli::run()
}
