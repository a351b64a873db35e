fn main() -> Result<(), Box<dyn std::error::Error>> {
    warbell::runtime::run()
}
