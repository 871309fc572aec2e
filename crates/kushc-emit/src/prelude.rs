//! The fixed C preamble every emitted translation unit opens with.
//!
//! spec.md's Non-goals exclude a garbage collector and a standard
//! library, but an emitted program still has to link and run, so a
//! minimal runtime shim travels ahead of every `#include` block:
//! fixed-width integer typedefs come from the standard headers already;
//! the remaining gaps are things C itself has no native spelling for —
//! an integer exponentiation operator (`**`), and `throw`/`try`/`catch`,
//! which this emitter lowers onto `setjmp`/`longjmp` (see `stmt.rs`).
//! All of it is tiny enough to inline rather than pull in as a separate
//! linked library, matching spec.md §4.8's "the emitter's output must
//! compile standalone with a C99 toolchain".
pub const RUNTIME_PRELUDE: &str = "\
#include <stdbool.h>
#include <stdint.h>
#include <stdio.h>
#include <stdlib.h>
#include <math.h>
#include <setjmp.h>

typedef struct String {
    char *data;
    uint64_t length;
} String;

static inline int64_t kush_ipow(int64_t base, int64_t exponent) {
    int64_t result = 1;
    while (exponent > 0) {
        if (exponent & 1) {
            result *= base;
        }
        base *= base;
        exponent >>= 1;
    }
    return result;
}

#define KUSH_MAX_TRY_DEPTH 64
static jmp_buf kush_jmp_stack[KUSH_MAX_TRY_DEPTH];
static int kush_jmp_depth = 0;
static void *kush_exception = NULL;

static inline void kush_throw(void *value) {
    kush_exception = value;
    if (kush_jmp_depth == 0) {
        fprintf(stderr, \"uncaught exception\\n\");
        abort();
    }
    longjmp(kush_jmp_stack[kush_jmp_depth - 1], 1);
}
";
