use crate::{
    lang::{code::Opcode, source_buffer::SourceLocation},
    runtime::{
        data_structures::{Cell, dictionary::WordId},
        error,
        interpreter::{Interpreter, NativeHandler, NativeWord, forth_vm::ForthVm},
    },
};
use std::rc::Rc;
use tracing::debug;

impl ForthVm {
    /// Register a native word under `name`.  The word can then be called from source code and
    /// through `execute` exactly like a word defined in the language.
    ///
    /// A small thunk is compiled for the word, `(jmp) over; (native) index; exit`, and the word is
    /// defined at the `(native)` instruction.  The leading jump keeps the engine from running the
    /// thunk as top level code.
    pub fn register_native<F>(&mut self, name: &str, handler: F) -> error::Result<WordId>
    where
        F: Fn(&mut dyn Interpreter) -> error::Result<()> + 'static,
    {
        self.register_native_at(SourceLocation::new(), name, Rc::new(handler))
    }

    /// Register a native word, recording where in the host's source it was registered from.  Use
    /// the `add_native_word!` macro to fill in the location automatically.
    pub fn register_native_at(
        &mut self,
        location: SourceLocation,
        name: &str,
        handler: Rc<NativeHandler>,
    ) -> error::Result<WordId> {
        let id = self.new_definition(name)?;
        let index = self.natives.len();

        self.natives
            .push(NativeWord::new(name.to_string(), location.clone(), handler));

        self.code.emit_op(Opcode::Jump);
        let over = self.code.emit(-1);
        let address = self.code.emit_op(Opcode::CallNative);
        self.code.emit(index as Cell);
        self.code.emit_op(Opcode::Exit);
        self.code.patch(over, self.code.len() as Cell)?;

        self.dictionary.define(id, address)?;

        debug!(name, id, address, index, %location, "native word registered");
        Ok(id)
    }

    /// The native words registered so far, in registration order.
    pub fn native_words(&self) -> &[NativeWord] {
        &self.natives
    }
}
