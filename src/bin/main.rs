fn main() {
    swimmer::main();
}
