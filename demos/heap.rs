use std::ptr;

use libc::sbrk;
use seglloc::{CheckTag, Heap};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().read_line(&mut String::new());
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  // RUST_LOG=seglloc=trace cargo run --example heap shows every arena
  // grow, split and coalesce as it happens.
  let _ = env_logger::try_init();

  // Our segregated-fit heap. It holds:
  // - an arena grown on demand via sbrk
  // - a size-class index of free blocks
  // - the offset of the current epilogue
  let mut heap = Heap::new();

  unsafe {
    // Initial state: no memory requested yet.
    print_program_break("start");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 1) Allocate 4 bytes (a u32's worth), show the block is usable.
    // ------------------------------------------------------------------
    let first_block = heap.alloc(4).expect("allocation failed");
    println!("\n[1] Allocate 4 bytes -> {:?}", first_block);

    let first_ptr = first_block as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written to first_block = 0x{:X}", first_ptr.read());

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 2) Allocate 12 bytes, show an "odd-sized" request still rounds to
    //    an 8-byte-aligned block.
    // ------------------------------------------------------------------
    let second_block = heap.alloc(12).expect("allocation failed");
    println!("\n[2] Allocate 12 bytes -> {:?}", second_block);
    ptr::write_bytes(second_block, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 3) Allocate a u64's worth, confirm the returned address is 8-byte
    //    aligned.
    // ------------------------------------------------------------------
    let third_block = heap.alloc(8).expect("allocation failed");
    println!("\n[3] Allocate 8 bytes -> {:?}", third_block);

    let third_ptr = third_block as *mut u64;
    third_ptr.write(0x1122334455667788);
    println!("[3] Value written = 0x{:X}", third_ptr.read());

    let addr_third = third_block as usize;
    println!("[3] Address = {:#X}, addr % 8 = {}", addr_third, addr_third % 8);

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 4) Allocate an array-sized block to force more carving.
    // ------------------------------------------------------------------
    let fourth_block = heap.alloc(32).expect("allocation failed");
    println!("\n[4] Allocate 32 bytes -> {:?}", fourth_block);
    let fourth_ptr = fourth_block as *mut u16;
    for i in 0..16 {
      fourth_ptr.add(i).write(i as u16);
    }
    println!("[4] Wrote 0..15 into the block");

    assert!(heap.check(CheckTag(1), false).is_empty(), "heap should be consistent here");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 5) Free the first block.
    //
    //    Unlike a bump allocator, this is not a no-op: the block joins
    //    its size class's free list (and coalesces with any free
    //    physical neighbor) and can be reused.
    // ------------------------------------------------------------------
    heap.free(first_block);
    println!("\n[5] Freed first_block at {:?}", first_block);
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 6) Allocate a small block to see the freed block get reused.
    // ------------------------------------------------------------------
    let fifth_block = heap.alloc(2).expect("allocation failed");
    println!("\n[6] Allocate 2 bytes -> {:?}", fifth_block);
    println!(
      "[6] fifth_block == first_block? {}",
      if fifth_block == first_block {
        "Yes, it reused the freed block"
      } else {
        "No, it allocated somewhere else"
      }
    );

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 7) Allocate a large block to observe heap growth via sbrk.
    // ------------------------------------------------------------------
    print_program_break("before large alloc");

    let big_block = heap.alloc(64 * 1024).expect("allocation failed");
    println!("\n[7] Allocate a large 64 KiB block -> {:?}", big_block);

    print_program_break("after large alloc");
    assert!(heap.check(CheckTag(2), false).is_empty(), "heap should still be consistent");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 8) End of demo.
    //
    //    The arena never shrinks: the OS reclaims everything when the
    //    process exits.
    // ------------------------------------------------------------------
    println!("\n[8] End of example. Process will exit and the OS will reclaim all memory.");
  }
}
