use incast::error::AppResult;

fn main() -> AppResult<()> {
    incast::run()
}
