fn main() {
    disaster_pipeline_lib::run()
}
