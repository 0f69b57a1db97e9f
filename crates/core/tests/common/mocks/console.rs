use blitz_core::soc::Console;
use mockall::mock;
use std::io;

mock! {
    pub HostConsole {}
    impl Console for HostConsole {
        fn poll(&mut self) -> Option<u8>;
        fn wait_byte(&mut self) -> Option<u8>;
        fn is_exhausted(&self) -> bool;
        fn emit(&mut self, byte: u8) -> io::Result<()>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

impl MockHostConsole {
    /// A console with no input that accepts any output.
    pub fn silent() -> Self {
        let mut console = Self::new();
        console.expect_poll().returning(|| None);
        console.expect_wait_byte().returning(|| None);
        console.expect_is_exhausted().return_const(true);
        console.expect_emit().returning(|_| Ok(()));
        console.expect_flush().returning(|| Ok(()));
        console
    }
}
