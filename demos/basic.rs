use tag_registry::TagStore;

fn main() -> Result<(), tag_registry::Error> {
    let path = std::env::temp_dir().join("tag_registry_example_basic.json");
    let _ = std::fs::remove_file(&path);

    {
        let store = TagStore::builder(&path).pretty(true).build()?;

        store.set(76561198000000000, "Alice#1234");
        store.set(76561198000000001, "Bob#5678");
        println!("alice   = {:?}", store.get(76561198000000000));
        println!("unknown = {:?}", store.get(1));

        // overwrite
        store.set(76561198000000000, "Alice#9999");
        println!("alice after update = {:?}", store.get(76561198000000000));
        println!("len = {}", store.len());

        // dropping the handle waits for the pending write
    }

    let contents = std::fs::read_to_string(&path)?;
    println!("On-disk JSON:\n{contents}");

    let reopened = TagStore::open(&path)?;
    println!("reloaded alice = {:?}", reopened.get(76561198000000000));

    drop(reopened);
    let _ = std::fs::remove_file(&path);
    Ok(())
}
