use rallocator::{AllocatorConfig, Arena, FreeListAllocator, HEADER_SIZE, MAX_HEAP_SIZE, SearchMode};
use tracing_subscriber::EnvFilter;

/// Prints the arena bookkeeping and the current free list.
fn print_state(
  label: &str,
  allocator: &FreeListAllocator,
) {
  let arena = allocator.arena();
  println!(
    "[{}] start = {:?}, top = {:?}, size = {} bytes",
    label,
    arena.start(),
    arena.top(),
    arena.size(),
  );
  for block in allocator.free_blocks() {
    println!("    free block at +{:<6} {} bytes", block.offset, block.size);
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // SEARCH_SCHEME picks FIRST_FIT, BEST_FIT or WORST_FIT. Anything else
  // leaves the allocator unable to serve requests, so fall back to the
  // default mode and say so.
  let mut config = AllocatorConfig::from_env();
  if config.search_mode == SearchMode::Unset {
    println!("SEARCH_SCHEME missing or unknown, using {}", SearchMode::default());
    config.search_mode = SearchMode::default();
  }
  println!("search mode: {}", config.search_mode);

  let arena = Arena::with_capacity(MAX_HEAP_SIZE);
  let mut allocator = match FreeListAllocator::init(arena, config) {
    Ok(allocator) => allocator,
    Err(err) => {
      eprintln!("cannot set up allocator: {err}");
      return;
    }
  };
  print_state("init", &allocator);

  // --------------------------------------------------------------------
  // 1) Carve three holes of 32, 128 and 64 bytes, each followed by a
  //    small block that stays live so the holes cannot merge.
  // --------------------------------------------------------------------
  let mut holes = Vec::new();
  for block in [32, 128, 64] {
    holes.push(allocator.allocate(block - HEADER_SIZE));
    allocator.allocate(8);
  }
  for &hole in &holes {
    unsafe { allocator.free(hole) };
  }
  print_state("holes", &allocator);

  // --------------------------------------------------------------------
  // 2) Ask for 40 bytes. Which hole is picked depends on the mode:
  //    first-fit and worst-fit take the 128-byte hole, best-fit the 64.
  // --------------------------------------------------------------------
  let picked = allocator.allocate(40);
  let hole = holes.iter().position(|&h| h == picked);
  println!("\n[2] allocate(40) -> {:?} (hole {:?})", picked, hole);
  print_state("after pick", &allocator);

  // --------------------------------------------------------------------
  // 3) Grow the block through reallocate. The contents move with it.
  // --------------------------------------------------------------------
  unsafe {
    picked.write_bytes(0x5A, 40);
    let moved = allocator.reallocate(picked, 400);
    println!("\n[3] reallocate(400) -> {:?}, first byte = {:#X}", moved, moved.read());
    allocator.free(moved);
  }
  print_state("after realloc", &allocator);

  // --------------------------------------------------------------------
  // 4) Reset rewinds the arena; all blocks above are gone.
  // --------------------------------------------------------------------
  if let Err(err) = allocator.reset() {
    eprintln!("reset failed: {err}");
    return;
  }
  print_state("reset", &allocator);
}
